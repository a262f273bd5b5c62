use std::time::{Duration, Instant};

/// Single-shot, reschedulable auto-hide timer.
///
/// The timer never runs anything itself: the owner asks for the
/// [`deadline`](Self::deadline), sleeps until then, and calls
/// [`poll`](Self::poll) on its own thread. Cancellation is therefore
/// synchronous.
#[derive(Debug)]
pub struct AutoHideTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutoHideTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Affects the next [`start`](Self::start) only.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a firing `delay` after `now`, replacing any pending one.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending firing without waiting. Returns false if nothing
    /// was pending.
    pub fn fire_now(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
