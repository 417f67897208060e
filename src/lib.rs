//! # Prometheus Rate Queue
//!
//! A bounded, priority-ordered, rate-limited work queue for AI agent workloads.
//!
//! Callers submit units of work with a priority hint. The queue admits them
//! subject to a capacity bound, executes them one at a time behind a
//! per-window throughput cap, and delivers exactly one outcome per submitted
//! unit through an awaitable handle.
//!
//! ## Core Problem Solved
//!
//! Analysis backends behind AI tooling are typically metered:
//!
//! - **Rate Limits**: Backends accept only so many calls per second
//! - **Bounded Memory**: Producers must be pushed back once a backlog forms
//! - **Mixed Urgency**: Interactive requests should overtake batch work still waiting
//!
//! ## Key Features
//!
//! - **Capacity Bound**: At most `capacity` units pending (queued plus executing); excess is rejected
//! - **Priority Tiers**: Higher tiers first, FIFO within a tier
//! - **Fixed-Window Rate Cap**: At most `window_limit` execution starts per 1000 ms window
//! - **Single Drain Loop**: Started on demand, idles when the buffer empties
//! - **Exactly-Once Outcomes**: Every submission resolves once, with a result or a typed error
//! - **Clear**: Cancel everything still queued in one step
//!
//! ## Example
//!
//! ```rust,ignore
//! use prometheus_rate_queue::config::QueueConfig;
//! use prometheus_rate_queue::core::DrainQueue;
//! use prometheus_rate_queue::infra::ClassifyExecutor;
//! use serde_json::json;
//!
//! let queue = DrainQueue::on_current_runtime(
//!     QueueConfig::new(5, 100, 3),
//!     ClassifyExecutor::new(),
//! )?;
//!
//! let urgent = queue.submit(json!("interactive request"), 2, None);
//! let batch = queue.submit(json!({"file": "a.rs"}), 0, None);
//!
//! let classification = urgent.await?;
//! println!("{:?} {}", classification.category, classification.confidence);
//! # let _ = batch;
//! ```
//!
//! For complete examples, see `tests/drain_queue_test.rs`.

/// Core scheduling abstractions, rate accounting and outcome delivery.
pub mod core;
/// Configuration models for queues and schedulers.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Infrastructure adapters: ordered buffers and the default work function.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::config::QueueConfig;
pub use crate::core::{DrainQueue, OutcomeHandle, QueueError, QueueStatus, UnitError};
