//! Fixed-window execution-start counter.
//!
//! Counts how many units started inside the current window and reports how
//! long to wait once the limit is reached. This is a fixed window, not a
//! sliding one: two starts a few milliseconds apart on either side of a
//! window boundary count against different windows.

use std::time::Duration;

use tokio::time::Instant;

/// Length of one rate window.
pub const WINDOW_DURATION: Duration = Duration::from_millis(1000);

/// Result of a rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    /// A unit may start now.
    Ready,
    /// The window is exhausted; retry after this long.
    Wait(Duration),
}

/// Tracks starts within the current fixed window.
#[derive(Debug, Clone)]
pub struct RateWindow {
    limit: u32,
    window_start: Instant,
    started: u32,
}

impl RateWindow {
    /// Create a tracker whose first window opens at `now`.
    #[must_use]
    pub const fn new(limit: u32, now: Instant) -> Self {
        Self {
            limit,
            window_start: now,
            started: 0,
        }
    }

    fn roll(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= WINDOW_DURATION {
            self.window_start = now;
            self.started = 0;
        }
    }

    /// Decide whether a unit may start at `now`.
    pub fn check(&mut self, now: Instant) -> WindowDecision {
        self.roll(now);
        if self.started < self.limit {
            WindowDecision::Ready
        } else {
            WindowDecision::Wait(self.until_reset(now))
        }
    }

    /// Count one execution start against the current window.
    pub const fn record_start(&mut self) {
        self.started = self.started.saturating_add(1);
    }

    /// Starts counted in the window containing `now`.
    pub fn started_this_window(&mut self, now: Instant) -> u32 {
        self.roll(now);
        self.started
    }

    /// Time left until the window containing `now` resets.
    pub fn until_reset(&mut self, now: Instant) -> Duration {
        self.roll(now);
        WINDOW_DURATION.saturating_sub(now.saturating_duration_since(self.window_start))
    }

    /// Configured starts per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}
