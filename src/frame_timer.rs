//! Sleep-driven frame source for the terminal host.

use speedread_core::{FrameToken, HostTimer};
use std::thread;
use std::time::{Duration, Instant};

pub struct SleepTimer {
    origin: Instant,
    interval: Duration,
    next_id: u64,
    pending: Option<FrameToken>,
}

impl SleepTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval: interval.max(Duration::from_millis(1)),
            next_id: 0,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleeps one frame and hands back the outstanding request, if any.
    pub fn wait_for_frame(&mut self) -> Option<FrameToken> {
        let token = self.pending.take()?;
        thread::sleep(self.interval);
        Some(token)
    }
}

impl HostTimer for SleepTimer {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn request_frame(&mut self) -> FrameToken {
        self.next_id = self.next_id.wrapping_add(1);
        let token = FrameToken::new(self.next_id);
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
    fn fires_only_requested_frames() {
        let mut timer = SleepTimer::new(Duration::from_millis(1));
        assert!(timer.wait_for_frame().is_none());

        let token = timer.request_frame();
        let before = timer.now();
        assert_eq!(timer.wait_for_frame(), Some(token));
        assert!(timer.now() > before);
        assert!(timer.wait_for_frame().is_none());
    }

    #[test]
    fn cancelled_frame_never_fires() {
        let mut timer = SleepTimer::new(Duration::ZERO);
        assert_eq!(timer.interval(), Duration::from_millis(1));
        let token = timer.request_frame();
        timer.cancel_frame(token);
        assert!(timer.wait_for_frame().is_none());
    }
}
