//! batch-core: ciclo de vida de la ejecución de un step.
//!
//! Un `TaskletStep` ejecuta un `Tasklet` exactamente una vez, registra cada
//! transición de `BatchStatus` en un `JobRepository` y normaliza cualquier
//! falla del tasklet en un `BatchCriticalError`.
pub mod constants;
pub mod errors;
pub mod repo;
pub mod runner;
pub mod step;

pub use errors::{BatchCriticalError, BoxError, RepositoryError, StepExecutionError, TaskletFailure};
pub use repo::{InMemoryJobRepository, JobRepository, StepCheckpoint};
pub use runner::execute;
pub use step::{tasklet_fn, BatchStatus, ExitStatus, Step, StepExecution, Tasklet, TaskletStep};
