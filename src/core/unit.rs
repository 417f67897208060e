//! Unit metadata, lifecycle states and the scheduled unit wrapper.

use serde::{Deserialize, Serialize};

use crate::util::serde::{Priority, UnitId};

/// Lifecycle state of a unit.
///
/// Transitions only move forward: `Queued -> Executing -> Done`, or straight
/// to `Rejected` when admission fails or the queue is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// Admitted and waiting in the ordered buffer.
    Queued,
    /// Dequeued by the drain loop and running.
    Executing,
    /// Outcome delivered, slot released.
    Done,
    /// Never ran: capacity exceeded or cleared while queued.
    Rejected,
}

/// Metadata describing an admitted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMetadata {
    /// Unit identifier.
    pub id: UnitId,
    /// Clamped priority tier.
    pub priority: Priority,
    /// Admission order, increasing across the life of a queue.
    pub sequence: u64,
    /// Admission timestamp in milliseconds since epoch.
    pub enqueued_at_ms: u128,
}

/// A unit held by a queue buffer: metadata plus opaque payload.
#[derive(Debug)]
pub struct ScheduledUnit<T> {
    /// Metadata driving ordering decisions.
    pub meta: UnitMetadata,
    /// Payload supplied by the caller.
    pub payload: T,
}
