//! Persistencia de `StepExecution`: trait `JobRepository` e implementación en
//! memoria.

mod store;
mod types;

pub use store::{InMemoryJobRepository, JobRepository};
pub use types::StepCheckpoint;
