//! Configuration models for queues and schedulers.

pub mod queue;

pub use queue::{QueueConfig, SchedulerConfig};
