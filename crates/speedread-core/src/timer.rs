//! Host frame facility the scheduler is driven by.
//!
//! A host hands out one [`FrameToken`] per requested frame and later calls
//! back into the scheduler with that token. Frame spacing is up to the host.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait HostTimer {
    /// Monotonic time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;

    /// Asks for one callback on the next frame.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraws a request. Cancelling an already-fired token is a no-op.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Hand-cranked timer for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    next_id: u64,
    pending: Option<FrameToken>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Removes and returns the outstanding request, as a host does when it fires.
    pub fn take_pending(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }
}

impl HostTimer for ManualTimer {
    fn now(&self) -> Duration {
        self.now
    }

    fn request_frame(&mut self) -> FrameToken {
        self.next_id = self.next_id.wrapping_add(1);
        let token = FrameToken(self.next_id);
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_only_drops_matching_request() {
        let mut timer = ManualTimer::new();
        let first = timer.request_frame();
        let second = timer.request_frame();
        assert_ne!(first, second);

        timer.cancel_frame(first);
        assert_eq!(timer.pending(), Some(second));

        timer.cancel_frame(second);
        assert_eq!(timer.pending(), None);
    }

    #[test]
    fn advancing_moves_clock_forward() {
        let mut timer = ManualTimer::new();
        timer.advance_ms(40);
        timer.advance(Duration::from_millis(2));
        assert_eq!(timer.now(), Duration::from_millis(42));
    }
}
