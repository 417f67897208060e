//! Core scheduling abstractions, rate accounting and outcome delivery.

pub mod audit;
pub mod drain_queue;
pub mod error;
pub mod executor;
pub mod rate_window;
pub mod sink;
pub mod stats;
pub mod unit;

pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
pub use drain_queue::{DrainQueue, DrainState, HandleFor, Spawn, TaskQueue};
pub use error::{AppResult, ConfigError, QueueError, UnitError};
pub use executor::{executor_fn, FnExecutor, TaskExecutor};
pub use rate_window::{RateWindow, WindowDecision, WINDOW_DURATION};
pub use sink::{result_channel, Outcome, OutcomeHandle, ResultSink};
pub use stats::{QueueStats, QueueStatus};
pub use unit::{ScheduledUnit, UnitMetadata, UnitState};
