//! Host-facing reader controller.
//!
//! A `ReaderSession` owns the playback scheduler and the lifecycle state
//! machine and keeps them in step: every command moves both, and reaching
//! the end of the sequence drops the reader into `Paused`.

use crate::navigation::{
    format_time, next_paragraph_boundary, previous_paragraph_boundary, remaining_time_secs,
    skip_word_count,
};
use crate::observer::Subscription;
use crate::pacing::TimingConfig;
use crate::progress::ProgressEntry;
use crate::scheduler::{PlaybackObserver, PlaybackScheduler, TickOutcome};
use crate::state_machine::{ReaderState, StateChange, StateMachine};
use crate::timer::{FrameToken, HostTimer};
use crate::word::Extraction;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::{debug, info};

pub const DEFAULT_SKIP_SECONDS: f64 = 10.0;
pub const DEFAULT_WPM_STEP: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Reading time covered by one skip.
    pub skip_seconds: f64,
    pub wpm_step: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            skip_seconds: DEFAULT_SKIP_SECONDS,
            wpm_step: DEFAULT_WPM_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Start,
    TogglePlayPause,
    SkipForward,
    SkipBackward,
    NextParagraph,
    PreviousParagraph,
    IncreaseWpm,
    DecreaseWpm,
    Seek { fraction: f64 },
    ShowSource,
    HideSource,
    Close,
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Start => "reader_start",
            Self::TogglePlayPause => "reader_toggle_play_pause",
            Self::SkipForward => "reader_skip_forward",
            Self::SkipBackward => "reader_skip_backward",
            Self::NextParagraph => "reader_next_paragraph",
            Self::PreviousParagraph => "reader_previous_paragraph",
            Self::IncreaseWpm => "reader_increase_wpm",
            Self::DecreaseWpm => "reader_decrease_wpm",
            Self::Seek { .. } => "reader_seek",
            Self::ShowSource => "reader_show_source",
            Self::HideSource => "reader_hide_source",
            Self::Close => "reader_close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: ReaderState,
    pub current_index: usize,
    pub total_words: usize,
    pub target_wpm: u32,
    pub is_playing: bool,
    pub remaining_secs: f64,
    pub remaining_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: SessionSnapshot,
}

pub struct ReaderSession<T: HostTimer, O: PlaybackObserver> {
    scheduler: PlaybackScheduler<T, O>,
    state: StateMachine,
    options: SessionOptions,
}

impl<T: HostTimer, O: PlaybackObserver> ReaderSession<T, O> {
    pub fn new(timer: T, observer: O, timing: TimingConfig, options: SessionOptions) -> Self {
        Self {
            scheduler: PlaybackScheduler::new(timer, observer, timing),
            state: StateMachine::new(),
            options,
        }
    }

    pub fn load(&mut self, extraction: Extraction) {
        let Extraction { words, boundaries } = extraction;
        self.scheduler.load(words, boundaries);
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> SessionEvent {
        let action = command.action();
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::TogglePlayPause => self.toggle_play_pause(),
            SessionCommand::SkipForward => self.skip_forward(),
            SessionCommand::SkipBackward => self.skip_backward(),
            SessionCommand::NextParagraph => self.next_paragraph(),
            SessionCommand::PreviousParagraph => self.previous_paragraph(),
            SessionCommand::IncreaseWpm => self.increase_wpm(),
            SessionCommand::DecreaseWpm => self.decrease_wpm(),
            SessionCommand::Seek { fraction } => self.scheduler.seek_to_fraction(fraction),
            SessionCommand::ShowSource => self.show_source(),
            SessionCommand::HideSource => self.hide_source(),
            SessionCommand::Close => self.close(),
        }
        debug!(action, state = %self.state.state(), "Applied reader command");
        SessionEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    /// Nothing happens until a non-empty sequence is loaded.
    pub fn start(&mut self) {
        self.scheduler.play();
        if self.scheduler.is_playing() {
            self.state.start_reading();
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.scheduler.is_playing() {
            self.scheduler.pause();
            self.state.pause_reading();
        } else {
            self.start();
        }
    }

    pub fn skip_forward(&mut self) {
        self.scheduler.skip_forward(self.skip_words());
    }

    pub fn skip_backward(&mut self) {
        self.scheduler.skip_backward(self.skip_words());
    }

    pub fn next_paragraph(&mut self) {
        let target =
            next_paragraph_boundary(self.scheduler.current_index(), self.scheduler.boundaries());
        self.jump_to(target);
    }

    pub fn previous_paragraph(&mut self) {
        let target = previous_paragraph_boundary(
            self.scheduler.current_index(),
            self.scheduler.boundaries(),
        );
        self.jump_to(target);
    }

    pub fn increase_wpm(&mut self) {
        let wpm = self
            .scheduler
            .target_wpm()
            .saturating_add(self.options.wpm_step);
        self.scheduler.set_target_wpm(wpm);
    }

    pub fn decrease_wpm(&mut self) {
        let wpm = self
            .scheduler
            .target_wpm()
            .saturating_sub(self.options.wpm_step);
        self.scheduler.set_target_wpm(wpm);
    }

    pub fn set_target_wpm(&mut self, wpm: u32) {
        self.scheduler.set_target_wpm(wpm);
    }

    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.scheduler.set_timing(timing);
    }

    /// Pauses and hands the screen back to the source document.
    pub fn show_source(&mut self) {
        self.scheduler.pause();
        self.state.show_source();
    }

    pub fn hide_source(&mut self) {
        self.state.hide_source();
        if self.state.is(ReaderState::Reading) {
            self.scheduler.play();
        }
    }

    /// Stops reading. Callers wanting to persist the position take a
    /// [`checkpoint`](Self::checkpoint) first.
    pub fn close(&mut self) {
        self.scheduler.pause();
        self.state.stop();
    }

    pub fn on_frame(&mut self, token: FrameToken) -> TickOutcome {
        let outcome = self.scheduler.on_frame(token);
        if outcome == TickOutcome::Completed {
            self.state.pause_reading();
        }
        outcome
    }

    /// Moves to the saved paragraph start. Returns whether the position changed.
    pub fn resume_from(&mut self, entry: &ProgressEntry) -> bool {
        if entry.paragraph_start_index == 0 || self.scheduler.total_words() == 0 {
            return false;
        }
        let index = i64::try_from(entry.paragraph_start_index).unwrap_or(i64::MAX);
        self.scheduler.set_index(index);
        info!(
            paragraph_start = entry.paragraph_start_index,
            index = self.scheduler.current_index(),
            "Resumed from saved progress"
        );
        true
    }

    /// Position worth persisting, or `None` with nothing loaded.
    pub fn checkpoint(&self, now: SystemTime) -> Option<ProgressEntry> {
        if self.scheduler.total_words() == 0 {
            return None;
        }
        Some(ProgressEntry::at_word(
            self.scheduler.current_index(),
            self.scheduler.boundaries(),
            now,
        ))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let total = self.scheduler.total_words();
        let current = self.scheduler.current_index();
        let remaining_words = total.saturating_sub(current);
        let remaining_secs = remaining_time_secs(remaining_words, self.scheduler.target_wpm());
        SessionSnapshot {
            state: self.state.state(),
            current_index: current,
            total_words: total,
            target_wpm: self.scheduler.target_wpm(),
            is_playing: self.scheduler.is_playing(),
            remaining_secs,
            remaining_label: format_time(remaining_secs),
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state.state()
    }

    pub fn on_state_change(&self, listener: impl FnMut(&StateChange) + 'static) -> Subscription {
        self.state.on_state_change(listener)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn scheduler(&self) -> &PlaybackScheduler<T, O> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PlaybackScheduler<T, O> {
        &mut self.scheduler
    }

    /// Stops playback, drops the words and returns the state machine to idle silently.
    pub fn destroy(&mut self) {
        self.scheduler.destroy();
        self.state.reset();
    }

    fn skip_words(&self) -> usize {
        skip_word_count(self.scheduler.target_wpm(), self.options.skip_seconds)
    }

    fn jump_to(&mut self, target: usize) {
        let index = i64::try_from(target).unwrap_or(i64::MAX);
        self.scheduler.set_index(index);
    }
}
