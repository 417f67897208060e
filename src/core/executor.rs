//! Work function abstraction.

use std::future::Future;

use async_trait::async_trait;

use super::UnitMetadata;

/// Pluggable work function run by the drain loop, one unit at a time.
///
/// Implementations map a payload to an outcome and must not hold on to queue
/// internals. Errors are handed to the submitter verbatim; nothing is retried.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_rate_queue::core::{TaskExecutor, UnitMetadata};
///
/// #[derive(Clone)]
/// struct WordCount;
///
/// #[async_trait]
/// impl TaskExecutor<String> for WordCount {
///     type Output = usize;
///     type Error = std::convert::Infallible;
///
///     async fn execute(&self, payload: String, _meta: UnitMetadata) -> Result<usize, Self::Error> {
///         Ok(payload.split_whitespace().count())
///     }
/// }
/// ```
#[async_trait]
pub trait TaskExecutor<P>: Send + Sync + 'static
where
    P: Send + 'static,
{
    /// Successful result type.
    type Output: Send + 'static;
    /// Failure type passed through to the submitter.
    type Error: Send + 'static;

    /// Execute one payload.
    ///
    /// # Arguments
    ///
    /// * `payload` - The caller's opaque payload
    /// * `meta` - A copy of the unit's metadata (id, priority, sequence)
    async fn execute(&self, payload: P, meta: UnitMetadata) -> Result<Self::Output, Self::Error>;
}

/// Adapter turning an async closure into a [`TaskExecutor`].
#[derive(Clone)]
pub struct FnExecutor<F> {
    f: F,
}

/// Wrap `f` so it can be used as a queue's work function.
pub const fn executor_fn<F>(f: F) -> FnExecutor<F> {
    FnExecutor { f }
}

#[async_trait]
impl<P, F, Fut, T, E> TaskExecutor<P> for FnExecutor<F>
where
    P: Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    async fn execute(&self, payload: P, _meta: UnitMetadata) -> Result<T, E> {
        (self.f)(payload).await
    }
}
