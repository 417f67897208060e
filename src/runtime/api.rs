//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{DrainQueue, Spawn, TaskExecutor, UnitState};
use crate::util::serde::UnitId;

/// Unit submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSubmission<P> {
    /// Optional caller-chosen identifier; generated when absent.
    #[serde(default)]
    pub unit_id: Option<String>,
    /// Priority hint, clamped by the queue.
    #[serde(default)]
    pub priority: i64,
    /// Opaque payload.
    pub payload: P,
}

/// Final outcome of a submitted unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitOutcomeResponse<T> {
    /// Unit identifier.
    pub unit_id: UnitId,
    /// `Done` on success or work failure, `Rejected` when the queue refused
    /// or cleared the unit.
    pub state: UnitState,
    /// Result when the work succeeded.
    pub result: Option<T>,
    /// Failure description otherwise.
    pub error: Option<String>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Submit a unit and wait for its outcome.
pub async fn submit_unit<P, X, S>(
    queue: &DrainQueue<P, X, S>,
    req: UnitSubmission<P>,
) -> UnitOutcomeResponse<X::Output>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
    X::Error: std::fmt::Display,
    S: Spawn,
{
    let handle = queue.submit(req.payload, req.priority, req.unit_id.map(UnitId::new));
    let unit_id = handle.id().clone();
    match handle.await {
        Ok(value) => UnitOutcomeResponse {
            unit_id,
            state: UnitState::Done,
            result: Some(value),
            error: None,
        },
        Err(err) => {
            let state = if err.queue_error().is_some() {
                UnitState::Rejected
            } else {
                UnitState::Done
            };
            UnitOutcomeResponse {
                unit_id,
                state,
                result: None,
                error: Some(err.to_string()),
            }
        }
    }
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}
