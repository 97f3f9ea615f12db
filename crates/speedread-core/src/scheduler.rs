//! Accumulator-driven playback loop.
//!
//! Each host frame adds the elapsed wall-clock time to a residual. A word
//! advances once the residual covers that word's interval, and the leftover
//! carries into the next word. Variable per-word durations are therefore
//! honoured no matter how irregular the host frames are.

use crate::navigation::{clamp_backward, clamp_forward};
use crate::pacing::TimingConfig;
use crate::timer::{FrameToken, HostTimer};
use crate::word::{ParagraphBoundaries, WordRecord};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Receiver for the three renderer-facing channels.
pub trait PlaybackObserver {
    fn word_changed(&mut self, word: &WordRecord, index: usize);
    fn progress(&mut self, current: usize, total: usize);
    fn completed(&mut self);
}

/// Owned copy of an observer callback, for recording and replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    WordChanged { index: usize, text: String },
    Progress { current: usize, total: usize },
    Completed,
}

impl PlaybackObserver for Vec<PlaybackEvent> {
    fn word_changed(&mut self, word: &WordRecord, index: usize) {
        self.push(PlaybackEvent::WordChanged {
            index,
            text: word.text.clone(),
        });
    }

    fn progress(&mut self, current: usize, total: usize) {
        self.push(PlaybackEvent::Progress { current, total });
    }

    fn completed(&mut self) {
        self.push(PlaybackEvent::Completed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The token was cancelled or superseded; nothing happened.
    Stale,
    /// Playback was not running.
    Idle,
    /// Still accumulating time for the current word.
    Waiting,
    Advanced,
    /// Moved past the last word; playback has stopped.
    Completed,
}

pub struct PlaybackScheduler<T: HostTimer, O: PlaybackObserver> {
    timer: T,
    observer: O,
    words: Rc<[WordRecord]>,
    boundaries: ParagraphBoundaries,
    current_index: usize,
    playing: bool,
    timing: TimingConfig,
    ramp_started_at: Duration,
    last_tick_at: Duration,
    residual_ms: f64,
    pending_frame: Option<FrameToken>,
}

impl<T: HostTimer, O: PlaybackObserver> PlaybackScheduler<T, O> {
    pub fn new(timer: T, observer: O, timing: TimingConfig) -> Self {
        Self {
            timer,
            observer,
            words: Rc::from(Vec::new()),
            boundaries: ParagraphBoundaries::default(),
            current_index: 0,
            playing: false,
            timing,
            ramp_started_at: Duration::ZERO,
            last_tick_at: Duration::ZERO,
            residual_ms: 0.0,
            pending_frame: None,
        }
    }

    /// Replaces the sequence and rewinds to its first word. Playback state is untouched.
    pub fn load(&mut self, words: impl Into<Rc<[WordRecord]>>, boundaries: ParagraphBoundaries) {
        self.words = words.into();
        self.boundaries = boundaries.truncated(self.words.len());
        self.current_index = 0;
        self.residual_ms = 0.0;
        info!(
            words = self.words.len(),
            paragraphs = self.boundaries.len(),
            "Loaded word sequence"
        );
        self.observer.progress(0, self.words.len());
    }

    pub fn play(&mut self) {
        if self.playing || self.words.is_empty() {
            return;
        }
        self.playing = true;
        let now = self.timer.now();
        self.ramp_started_at = now;
        self.last_tick_at = now;
        self.residual_ms = 0.0;
        debug!(
            index = self.current_index,
            wpm = self.timing.target_wpm(),
            "Playback started"
        );
        self.emit_current_word();
        self.schedule_frame();
    }

    pub fn pause(&mut self) {
        if self.playing {
            debug!(index = self.current_index, "Playback paused");
        }
        self.playing = false;
        if let Some(token) = self.pending_frame.take() {
            self.timer.cancel_frame(token);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seeks to `index`, clamped into the sequence; a no-op on an empty one.
    pub fn set_index(&mut self, index: i64) {
        let target = usize::try_from(index).unwrap_or(0);
        self.seek(target);
    }

    pub fn skip_forward(&mut self, words: usize) {
        let target = clamp_forward(self.current_index, self.words.len(), words);
        self.seek(target);
    }

    pub fn skip_backward(&mut self, words: usize) {
        let target = clamp_backward(self.current_index, words);
        self.seek(target);
    }

    /// Seeks to `floor(fraction * total)`.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let position = if fraction.is_nan() {
            0.0
        } else {
            (fraction * self.words.len() as f64).floor()
        };
        let target = if position <= 0.0 {
            0
        } else if position >= usize::MAX as f64 {
            usize::MAX
        } else {
            position as usize
        };
        self.seek(target);
    }

    pub fn set_target_wpm(&mut self, wpm: u32) {
        self.timing.set_target_wpm(wpm);
        debug!(wpm = self.timing.target_wpm(), "Target rate updated");
    }

    pub fn set_ramp_duration_secs(&mut self, seconds: f64) {
        self.timing.set_ramp_duration_secs(seconds);
    }

    pub fn set_paragraph_pause(&mut self, enabled: bool, seconds: f64) {
        self.timing.set_paragraph_pause(enabled, seconds);
    }

    pub fn set_paragraph_ramp_reset(&mut self, enabled: bool) {
        self.timing.set_paragraph_ramp_reset(enabled);
    }

    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    /// Pauses and rewinds to the first word.
    pub fn reset(&mut self) {
        self.pause();
        self.current_index = 0;
        self.residual_ms = 0.0;
        if !self.words.is_empty() {
            self.emit_current_word();
        }
    }

    /// Stops playback and drops the sequence. Later calls act on an empty sequence.
    pub fn destroy(&mut self) {
        self.pause();
        self.words = Rc::from(Vec::new());
        self.boundaries = ParagraphBoundaries::default();
        self.current_index = 0;
        self.residual_ms = 0.0;
        debug!("Scheduler released word sequence");
    }

    /// Host callback for a frame requested through the timer.
    pub fn on_frame(&mut self, token: FrameToken) -> TickOutcome {
        if self.pending_frame != Some(token) {
            trace!(token = token.id(), "Ignoring stale frame");
            return TickOutcome::Stale;
        }
        self.pending_frame = None;
        if !self.playing {
            return TickOutcome::Idle;
        }

        let now = self.timer.now();
        let delta = now.saturating_sub(self.last_tick_at);
        self.last_tick_at = now;
        self.residual_ms += delta.as_nanos() as f64 / 1_000_000.0;

        let interval = self.current_interval_ms(now);
        let outcome = if self.residual_ms >= interval {
            self.residual_ms -= interval;
            self.advance(now)
        } else {
            TickOutcome::Waiting
        };

        if self.playing {
            self.schedule_frame();
        }
        outcome
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_word(&self) -> Option<&WordRecord> {
        self.words.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn boundaries(&self) -> &ParagraphBoundaries {
        &self.boundaries
    }

    pub fn target_wpm(&self) -> u32 {
        self.timing.target_wpm()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    fn seek(&mut self, target: usize) {
        if self.words.is_empty() {
            return;
        }
        self.current_index = target.min(self.words.len() - 1);
        self.residual_ms = 0.0;
        debug!(index = self.current_index, "Seeked");
        self.emit_current_word();
    }

    fn current_interval_ms(&self, now: Duration) -> f64 {
        let Some(word) = self.words.get(self.current_index) else {
            return 0.0;
        };
        let elapsed_ms = now.saturating_sub(self.ramp_started_at).as_nanos() as f64 / 1_000_000.0;
        let next = self.current_index + 1;
        let ends_paragraph = next >= self.words.len() || self.boundaries.is_boundary(next);
        self.timing
            .word_interval_ms(&word.text, elapsed_ms, ends_paragraph)
    }

    fn advance(&mut self, now: Duration) -> TickOutcome {
        let next = self.current_index + 1;
        if next >= self.words.len() {
            self.pause();
            info!(words = self.words.len(), "Reached end of sequence");
            self.observer.completed();
            return TickOutcome::Completed;
        }

        self.current_index = next;
        if self.timing.paragraph_ramp_reset_enabled() && self.boundaries.is_boundary(next) {
            trace!(index = next, "Paragraph start; restarting ramp");
            self.ramp_started_at = now;
        }
        trace!(index = next, residual_ms = self.residual_ms, "Advanced");
        self.emit_current_word();
        TickOutcome::Advanced
    }

    fn emit_current_word(&mut self) {
        let total = self.words.len();
        if let Some(word) = self.words.get(self.current_index) {
            self.observer.word_changed(word, self.current_index);
            self.observer.progress(self.current_index + 1, total);
        }
    }

    fn schedule_frame(&mut self) {
        if let Some(stale) = self.pending_frame.take() {
            self.timer.cancel_frame(stale);
        }
        self.pending_frame = Some(self.timer.request_frame());
    }
}
