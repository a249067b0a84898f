//! Overlay auto-hide timer - a single cancellable deadline.
//!
//! The status overlay hides itself a short while after an action. Rapid
//! actions (holding an arrow key) must not stack up hides, so:
//! 1. Every arm cancels whatever was pending
//! 2. The host's update loop polls `tick()`, which fires at most once per arm
//!
//! At most one deadline is ever outstanding; an older, longer deadline can
//! never fire after a newer action replaced it.

use std::time::{Duration, Instant};

/// Default auto-hide delay for transient overlays
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Auto-hide delay after a pause
pub const PAUSE_INTERVAL_MS: u64 = 500;

/// Single-slot cancellable deadline.
///
/// # Usage
/// ```ignore
/// // On action:
/// timer.arm(Duration::from_millis(500));
///
/// // In update loop:
/// if timer.tick() {
///     hide_overlay();
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct OverlayTimer {
    /// Pending deadline, if armed
    deadline: Option<Instant>,
    /// Interval of the pending arm (for diagnostics)
    interval: Duration,
}

impl OverlayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `interval` from now, replacing any pending deadline
    pub fn arm(&mut self, interval: Duration) {
        self.arm_at(Instant::now(), interval);
    }

    /// Arm for `interval` from `now`, replacing any pending deadline
    pub fn arm_at(&mut self, now: Instant, interval: Duration) {
        self.cancel();
        self.deadline = Some(now + interval);
        self.interval = interval;
        log::trace!("OverlayTimer: armed for {}ms", interval.as_millis());
    }

    /// Drop the pending deadline. No-op when nothing is pending.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            log::trace!("OverlayTimer: cancelled pending {}ms hide", self.interval.as_millis());
        }
    }

    /// Poll against the wall clock
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Returns true exactly once when `now` reaches the deadline, then disarms.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now >= deadline {
            self.deadline = None;
            log::trace!("OverlayTimer: fired after {}ms", self.interval.as_millis());
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Interval of the pending arm
    pub fn pending_interval(&self) -> Option<Duration> {
        self.deadline.map(|_| self.interval)
    }
}
