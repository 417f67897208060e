//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{health, submit_unit, Health, UnitOutcomeResponse, UnitSubmission};
pub use tokio_spawner::TokioSpawner;
