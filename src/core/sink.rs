//! Per-unit result delivery.
//!
//! Each admitted or rejected unit gets a [`ResultSink`] / [`OutcomeHandle`]
//! pair over a one-shot channel. Resolving consumes the sink, so a unit can be
//! resolved at most once; dropping an unresolved sink resolves the handle with
//! [`QueueError::QueueCleared`], so a handle never hangs forever.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::debug;

use crate::core::{QueueError, UnitError};
use crate::util::serde::UnitId;

/// Outcome delivered for one unit.
pub type Outcome<R, E> = Result<R, UnitError<E>>;

/// Sending half: resolved exactly once by the queue.
#[derive(Debug)]
pub struct ResultSink<R, E> {
    id: UnitId,
    tx: oneshot::Sender<Outcome<R, E>>,
}

/// Receiving half returned from `submit`; await it for the unit's outcome.
#[derive(Debug)]
#[must_use = "an outcome handle does nothing unless awaited"]
pub struct OutcomeHandle<R, E> {
    id: UnitId,
    rx: oneshot::Receiver<Outcome<R, E>>,
}

/// Create a connected sink/handle pair for `id`.
pub fn result_channel<R, E>(id: UnitId) -> (ResultSink<R, E>, OutcomeHandle<R, E>) {
    let (tx, rx) = oneshot::channel();
    (
        ResultSink { id: id.clone(), tx },
        OutcomeHandle { id, rx },
    )
}

impl<R, E> ResultSink<R, E> {
    /// Identifier of the unit this sink resolves.
    pub const fn id(&self) -> &UnitId {
        &self.id
    }

    /// Deliver a successful result.
    pub fn succeed(self, value: R) {
        self.resolve(Ok(value));
    }

    /// Deliver a failure.
    pub fn fail(self, error: UnitError<E>) {
        self.resolve(Err(error));
    }

    /// Deliver an outcome. A dropped handle is not an error; the caller simply
    /// stopped listening.
    pub fn resolve(self, outcome: Outcome<R, E>) {
        if self.tx.send(outcome).is_err() {
            debug!(unit_id = %self.id, "outcome handle dropped before delivery");
        }
    }
}

impl<R, E> OutcomeHandle<R, E> {
    /// Identifier of the submitted unit.
    pub const fn id(&self) -> &UnitId {
        &self.id
    }
}

impl<R, E> Future for OutcomeHandle<R, E> {
    type Output = Outcome<R, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(UnitError::Queue(QueueError::QueueCleared))))
    }
}
