//! Reader lifecycle states.
//!
//! Being in `Reading` says the session is logically active; whether words are
//! actually advancing is the scheduler's business. Requests that have no edge
//! from the current state are ignored rather than treated as errors.

use crate::observer::{Listeners, Subscription};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReaderState {
    #[default]
    Idle,
    Reading,
    Paused,
    /// The user went back to the source document; the session stays live.
    SourceView,
}

impl std::fmt::Display for ReaderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReaderState::Idle => "idle",
            ReaderState::Reading => "reading",
            ReaderState::Paused => "paused",
            ReaderState::SourceView => "source-view",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: ReaderState,
    pub to: ReaderState,
}

#[derive(Default)]
pub struct StateMachine {
    state: ReaderState,
    listeners: Listeners<StateChange>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn is(&self, state: ReaderState) -> bool {
        self.state == state
    }

    pub fn on_state_change(&self, listener: impl FnMut(&StateChange) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn start_reading(&mut self) {
        if matches!(
            self.state,
            ReaderState::Idle | ReaderState::Paused | ReaderState::SourceView
        ) {
            self.transition(ReaderState::Reading);
        }
    }

    pub fn pause_reading(&mut self) {
        if self.state == ReaderState::Reading {
            self.transition(ReaderState::Paused);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            ReaderState::Reading => self.pause_reading(),
            ReaderState::Paused | ReaderState::SourceView => self.start_reading(),
            ReaderState::Idle => {}
        }
    }

    pub fn show_source(&mut self) {
        if self.state == ReaderState::Reading {
            self.transition(ReaderState::SourceView);
        }
    }

    pub fn hide_source(&mut self) {
        if self.state == ReaderState::SourceView {
            self.transition(ReaderState::Reading);
        }
    }

    pub fn stop(&mut self) {
        self.transition(ReaderState::Idle);
    }

    /// Forces `Idle` without notifying anyone.
    pub fn reset(&mut self) {
        self.state = ReaderState::Idle;
    }

    fn transition(&mut self, to: ReaderState) {
        if to == self.state {
            return;
        }
        let from = self.state;
        self.state = to;
        debug!(%from, %to, "Reader state changed");
        self.listeners.emit(&StateChange { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(machine: &StateMachine) -> (Rc<RefCell<Vec<StateChange>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = machine.on_state_change(move |change| sink.borrow_mut().push(*change));
        (seen, subscription)
    }

    #[test]
    fn starts_idle() {
        let machine = StateMachine::new();
        assert_eq!(machine.state(), ReaderState::Idle);
        assert!(machine.is(ReaderState::Idle));
    }

    #[test]
    fn follows_reading_lifecycle_edges() {
        let mut machine = StateMachine::new();
        let (seen, _subscription) = recording(&machine);

        machine.start_reading();
        machine.show_source();
        machine.hide_source();
        machine.pause_reading();
        machine.start_reading();
        machine.stop();

        let states: Vec<(ReaderState, ReaderState)> =
            seen.borrow().iter().map(|c| (c.from, c.to)).collect();
        assert_eq!(
            states,
            vec![
                (ReaderState::Idle, ReaderState::Reading),
                (ReaderState::Reading, ReaderState::SourceView),
                (ReaderState::SourceView, ReaderState::Reading),
                (ReaderState::Reading, ReaderState::Paused),
                (ReaderState::Paused, ReaderState::Reading),
                (ReaderState::Reading, ReaderState::Idle),
            ]
        );
    }

    #[test]
    fn illegal_requests_are_silent_noops() {
        let mut machine = StateMachine::new();
        let (seen, _subscription) = recording(&machine);

        machine.pause_reading();
        machine.show_source();
        machine.hide_source();
        machine.stop();
        machine.toggle_play_pause();

        assert_eq!(machine.state(), ReaderState::Idle);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn repeated_start_notifies_once() {
        let mut machine = StateMachine::new();
        let (seen, _subscription) = recording(&machine);

        machine.start_reading();
        machine.start_reading();

        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn source_view_can_resume_directly() {
        let mut machine = StateMachine::new();
        machine.start_reading();
        machine.show_source();

        machine.start_reading();
        assert_eq!(machine.state(), ReaderState::Reading);

        machine.show_source();
        machine.toggle_play_pause();
        assert_eq!(machine.state(), ReaderState::Reading);
        machine.toggle_play_pause();
        assert_eq!(machine.state(), ReaderState::Paused);
    }

    #[test]
    fn stop_works_from_any_state_and_reset_is_silent() {
        let mut machine = StateMachine::new();
        machine.start_reading();
        machine.pause_reading();
        machine.stop();
        assert_eq!(machine.state(), ReaderState::Idle);

        machine.start_reading();
        let (seen, _subscription) = recording(&machine);
        machine.reset();
        assert_eq!(machine.state(), ReaderState::Idle);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unsubscribed_listener_misses_later_changes() {
        let mut machine = StateMachine::new();
        let (seen, subscription) = recording(&machine);

        machine.start_reading();
        subscription.unsubscribe();
        machine.pause_reading();

        assert_eq!(seen.borrow().len(), 1);
    }
}
