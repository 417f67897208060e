//! Infrastructure adapters: the in-memory queue buffer and the default work
//! function.

pub mod classify;
pub mod queue;

pub use classify::{Classification, ClassifyExecutor, PayloadCategory};
pub use queue::InMemoryQueue;
