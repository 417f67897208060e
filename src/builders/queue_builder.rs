//! Builders to construct drain queues from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{QueueConfig, SchedulerConfig};
use crate::core::{AuditSink, ConfigError, DrainQueue, Spawn, TaskExecutor};

/// Builder for a single named queue.
pub struct QueueBuilder {
    name: String,
    config: QueueConfig,
    audit: Option<Arc<dyn AuditSink>>,
}

impl QueueBuilder {
    /// Start a builder for queue `name`.
    pub fn new(name: impl Into<String>, config: QueueConfig) -> Self {
        Self {
            name: name.into(),
            config,
            audit: None,
        }
    }

    /// Queue name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue configuration.
    #[must_use]
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Record lifecycle events into `sink`.
    #[must_use]
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Validate the configuration and build the queue.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the queue if validation fails.
    pub fn build<P, X, S>(self, executor: X, spawner: S) -> Result<DrainQueue<P, X, S>, ConfigError>
    where
        P: Send + 'static,
        X: TaskExecutor<P>,
        S: Spawn,
    {
        self.config
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("queue `{}` invalid: {e}", self.name)))?;
        Ok(DrainQueue::assemble(
            self.name,
            self.config,
            executor,
            spawner,
            self.audit,
        ))
    }
}

/// Build one queue per configured entry using an executor factory.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the scheduler config is invalid, or the
/// first error returned by `executor_factory`.
pub fn build_queues<P, X, S, FE>(
    cfg: &SchedulerConfig,
    mut executor_factory: FE,
    spawner: S,
) -> Result<HashMap<String, DrainQueue<P, X, S>>, ConfigError>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
    S: Spawn + Clone,
    FE: FnMut(&str, &QueueConfig) -> Result<X, ConfigError>,
{
    cfg.validate()
        .map_err(|e| ConfigError::Invalid(format!("config invalid: {e}")))?;

    let mut queues = HashMap::with_capacity(cfg.queues.len());
    for (name, queue_cfg) in &cfg.queues {
        let executor = executor_factory(name, queue_cfg)?;
        let queue = QueueBuilder::new(name.clone(), queue_cfg.clone()).build(executor, spawner.clone())?;
        queues.insert(name.clone(), queue);
    }

    Ok(queues)
}
