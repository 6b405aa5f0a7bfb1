//! batchflow: ejecuta un step batch bajo el protocolo de checkpoints de
//! `batch-core`, con persistencia en memoria o Postgres.
pub mod app;
pub mod config;
pub mod errors;
pub mod logging;
pub mod tasklets;

pub use app::{build_repository, run_step, show_step};
pub use config::{AppConfig, RepositoryBackend};
pub use errors::AppError;
pub use tasklets::{CommandError, CommandTasklet};
