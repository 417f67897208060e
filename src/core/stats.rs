//! Queue status snapshots and lifetime counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::util::serde::UnitId;

/// Point-in-time view of a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Units admitted and waiting in the buffer.
    pub queued_count: usize,
    /// Units counted against capacity (queued plus executing).
    pub pending_count: usize,
    /// Configured capacity.
    pub capacity: usize,
    /// Whether a drain loop is active.
    pub draining: bool,
    /// Unit currently running, if any.
    pub executing: Option<UnitId>,
    /// Starts counted in the current rate window.
    pub started_this_window: u32,
    /// Milliseconds until the current rate window resets.
    pub ms_until_window_reset: u64,
}

/// Lifetime counters for a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Every call to `submit`.
    pub submitted: u64,
    /// Submissions that got a slot.
    pub admitted: u64,
    /// Submissions rejected because the queue was full.
    pub rejected: u64,
    /// Units whose work function returned a result.
    pub completed: u64,
    /// Units whose work function returned an error or panicked.
    pub failed: u64,
    /// Queued units cancelled by `clear()`.
    pub cleared: u64,
}

/// Internal counters (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct QueueCounters {
    pub submitted: AtomicU64,
    pub admitted: AtomicU64,
    pub rejected: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub cleared: AtomicU64,
}

impl QueueCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> QueueStats {
        QueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cleared: self.cleared.load(Ordering::Relaxed),
        }
    }
}
