//! Terminal reading loop.
//!
//! Wires the core session to a sleep-driven frame source, the terminal
//! renderer, line-based controls and the on-disk progress book. The loop is
//! single-threaded; only stdin reading and Ctrl-C live on other threads.

use crate::cache::FileProgressStore;
use crate::cancellation::CancellationToken;
use crate::config::ActivationMode;
use crate::frame_timer::SleepTimer;
use crate::input::{HELP, HostInput, parse_input, spawn_stdin_reader};
use crate::render::TerminalRenderer;
use crate::settings::{SettingsChange, SettingsStore};
use anyhow::Result;
use speedread_core::tokenizer::extract_plain_text;
use speedread_core::{ProgressBook, ReaderSession, SessionCommand, TickOutcome};
use std::cell::RefCell;
use std::io::Stdout;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

type TerminalSession = ReaderSession<SleepTimer, TerminalRenderer<Stdout>>;

/// A loaded document and the key its progress and settings are stored under.
pub struct Document {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Completed,
    Closed,
    Interrupted,
}

pub fn run_reader(
    document: Document,
    mut settings: SettingsStore,
    cancel: CancellationToken,
) -> Result<()> {
    let config = settings.config().clone();
    let mut book = ProgressBook::with_retention_days(
        FileProgressStore::new(&config.cache_dir),
        config.progress_retention_days,
    );
    book.cleanup_expired(SystemTime::now());

    let extraction = extract_plain_text(&document.text);
    if extraction.total_words() == 0 {
        warn!(key = %document.key, "Document has no readable words");
        return Ok(());
    }
    info!(
        words = extraction.total_words(),
        paragraphs = extraction.paragraph_count(),
        "Document ready"
    );

    let timer = SleepTimer::new(Duration::from_millis(config.frame_interval_ms));
    let mut session = ReaderSession::new(
        timer,
        TerminalRenderer::stdout(),
        config.timing_config(),
        config.session_options(),
    );
    session.load(extraction);
    if let Some(entry) = book.load(&document.key, SystemTime::now()) {
        session.resume_from(&entry);
    }

    let pending = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);
    let _settings_subscription = settings.subscribe(move |change| sink.borrow_mut().push(*change));
    let _state_subscription = session.on_state_change(|change| {
        debug!(from = %change.from, to = %change.to, "Reader state");
    });

    let input = spawn_stdin_reader();
    let mut reader = TerminalReader {
        session,
        settings: &mut settings,
        pending,
        document: &document,
    };
    reader.message(HELP);

    let exit = if config.activation_mode == ActivationMode::Manual
        && !reader.wait_for_start(&input, &cancel)
    {
        LoopExit::Interrupted
    } else {
        reader.session.start();
        reader.run(&input, &cancel)
    };

    let now = SystemTime::now();
    match exit {
        LoopExit::Completed => {
            book.clear(&document.key);
            info!(key = %document.key, "Finished document; progress cleared");
        }
        LoopExit::Closed | LoopExit::Interrupted => {
            if let Some(entry) = reader.session.checkpoint(now) {
                book.save(
                    &document.key,
                    entry.paragraph_start_index,
                    entry.last_word_index,
                    now,
                );
            }
            reader.session.close();
            reader.message("");
            info!(?exit, "Reading stopped");
        }
    }
    reader.session.destroy();
    Ok(())
}

struct TerminalReader<'a> {
    session: TerminalSession,
    settings: &'a mut SettingsStore,
    pending: Rc<RefCell<Vec<SettingsChange>>>,
    document: &'a Document,
}

impl TerminalReader<'_> {
    fn wait_for_start(&mut self, input: &Receiver<String>, cancel: &CancellationToken) -> bool {
        self.message("Press Enter to start.");
        let interval = self.session.scheduler().timer().interval();
        loop {
            if cancel.is_cancelled() {
                return false;
            }
            match input.recv_timeout(interval) {
                Ok(_) => return true,
                Err(RecvTimeoutError::Timeout) => {}
                // Nothing will ever press Enter; start anyway.
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
    }

    fn run(&mut self, input: &Receiver<String>, cancel: &CancellationToken) -> LoopExit {
        loop {
            if cancel.is_cancelled() {
                return LoopExit::Interrupted;
            }
            while let Ok(line) = input.try_recv() {
                if self.handle_line(&line) == Some(LoopExit::Closed) {
                    return LoopExit::Closed;
                }
            }
            self.apply_settings_changes();

            let timer = self.session.scheduler_mut().timer_mut();
            let Some(token) = timer.wait_for_frame() else {
                // Paused; idle until input arrives.
                thread::sleep(timer.interval());
                continue;
            };
            if self.session.on_frame(token) == TickOutcome::Completed {
                return LoopExit::Completed;
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Option<LoopExit> {
        let Some(input) = parse_input(line) else {
            self.message(&format!("unknown control {:?}; ? for help", line.trim()));
            return None;
        };
        match input {
            HostInput::Session(SessionCommand::Close) => {
                return Some(LoopExit::Closed);
            }
            HostInput::Session(command) => {
                let event = self.session.apply_command(command);
                if command == SessionCommand::ShowSource {
                    if let Some(excerpt) = self.source_excerpt() {
                        self.message("");
                        self.message(&excerpt);
                    }
                }
                if !event.snapshot.is_playing {
                    self.message(&format!(
                        "{} at {}/{}, {} left",
                        event.snapshot.state,
                        event.snapshot.current_index + 1,
                        event.snapshot.total_words,
                        event.snapshot.remaining_label
                    ));
                }
            }
            HostInput::FasterWpm => {
                let wpm = self.session.snapshot().target_wpm;
                let step = self.session.options().wpm_step;
                self.settings.set_wpm(wpm.saturating_add(step));
            }
            HostInput::SlowerWpm => {
                let wpm = self.session.snapshot().target_wpm;
                let step = self.session.options().wpm_step;
                self.settings.set_wpm(wpm.saturating_sub(step));
            }
            HostInput::RampDuration(seconds) => self.settings.set_ramp_duration_secs(seconds),
            HostInput::ParagraphPause(Some(seconds)) => {
                self.settings.set_paragraph_pause(true, seconds)
            }
            HostInput::ParagraphPause(None) => {
                let seconds = self.settings.config().paragraph_pause_secs;
                self.settings.set_paragraph_pause(false, seconds);
            }
            HostInput::ParagraphRampReset(enabled) => {
                self.settings.set_paragraph_ramp_reset(enabled)
            }
            HostInput::Activation(mode) => self.settings.set_activation_mode(mode),
            HostInput::Help => self.message(HELP),
        }
        None
    }

    fn apply_settings_changes(&mut self) {
        let changes: Vec<SettingsChange> = self.pending.borrow_mut().drain(..).collect();
        for change in changes {
            match change {
                SettingsChange::Wpm(wpm) => {
                    self.session.set_target_wpm(wpm);
                    self.message(&format!("{wpm} wpm"));
                }
                SettingsChange::ActivationMode(mode) => {
                    self.message(&format!("next open starts in {mode} mode"));
                }
                SettingsChange::RampDurationSecs(_)
                | SettingsChange::ParagraphPause { .. }
                | SettingsChange::ParagraphRampReset(_) => {
                    self.session.set_timing(self.settings.config().timing_config());
                    self.message(&format!("applied {change:?}"));
                }
            }
        }
    }

    /// Source text of the paragraph holding the current word.
    fn source_excerpt(&self) -> Option<String> {
        let scheduler = self.session.scheduler();
        let words = scheduler.words();
        let current = words.get(scheduler.current_index())?;
        let paragraph = current.paragraph_index;
        let first = words.iter().find(|w| w.paragraph_index == paragraph)?;
        let last = words.iter().rev().find(|w| w.paragraph_index == paragraph)?;
        self.document
            .text
            .get(first.source_anchor.start..last.source_anchor.end)
            .map(str::to_string)
    }

    fn message(&mut self, text: &str) {
        self.session.scheduler_mut().observer_mut().message(text);
    }
}
