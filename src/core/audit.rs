//! Audit sink implementations.
//!
//! A queue with an attached sink records one event per lifecycle step of each
//! unit, plus one event per `clear()` call.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// Lifecycle step being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Unit admitted into the buffer.
    Submit,
    /// Unit rejected at admission.
    Reject,
    /// Unit dequeued and started.
    Start,
    /// Unit finished with a result.
    Complete,
    /// Unit finished with an error or panic.
    Fail,
    /// Queued units cancelled by `clear()`.
    Clear,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submit => "submit",
            Self::Reject => "reject",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related unit identifier, or `batch` for queue-wide events.
    pub unit_id: String,
    /// Queue name.
    pub queue: String,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction. Shared between the queue and its drain loop.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events matching `action`.
    pub fn events_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::debug!(
            target: "audit",
            event_id = %event.event_id,
            unit_id = %event.unit_id,
            queue = %event.queue,
            action = %event.action,
            detail = event.detail.as_deref().unwrap_or(""),
            "audit event"
        );
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    unit_id: impl Into<String>,
    queue: impl Into<String>,
    action: AuditAction,
    detail: Option<String>,
) -> AuditEvent {
    let unit_id = unit_id.into();
    let created_at_ms = now_ms();
    AuditEvent {
        event_id: format!("{unit_id}-{action}-{created_at_ms}"),
        unit_id,
        queue: queue.into(),
        action,
        created_at_ms,
        detail,
    }
}
