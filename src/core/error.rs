//! Error types for queue operations.

use thiserror::Error;

/// Errors produced by the queue itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Every pending slot is taken; the unit was never admitted.
    #[error("queue full: {pending} of {capacity} slots pending")]
    QueueFull {
        /// Configured capacity.
        capacity: usize,
        /// Pending units at the time of rejection.
        pending: usize,
    },
    /// The unit was still queued when the queue was cleared.
    #[error("queue cleared before unit started")]
    QueueCleared,
}

/// Failure outcome delivered to a unit's handle.
#[derive(Debug, Error)]
pub enum UnitError<E> {
    /// Rejected or cancelled by the queue.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// The work function returned an error, passed through verbatim.
    #[error("work failed: {0}")]
    Work(E),
    /// The work function panicked.
    #[error("work panicked: {0}")]
    Panicked(String),
}

impl<E> UnitError<E> {
    /// Returns the queue error if the unit was rejected or cleared.
    pub const fn queue_error(&self) -> Option<&QueueError> {
        match self {
            Self::Queue(err) => Some(err),
            _ => None,
        }
    }

    /// True if the unit never ran because capacity was exhausted.
    pub const fn is_queue_full(&self) -> bool {
        matches!(self, Self::Queue(QueueError::QueueFull { .. }))
    }

    /// True if the unit was cancelled by `clear()`.
    pub const fn is_cleared(&self) -> bool {
        matches!(self, Self::Queue(QueueError::QueueCleared))
    }
}

/// Errors raised while building queues from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration values failed validation.
    #[error("invalid queue config: {0}")]
    Invalid(String),
    /// Configuration text could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// No tokio runtime was available to host the drain loop.
    #[error("no tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
