use batch_core::StepExecutionError;
use batch_persistence::PersistenceError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Step(#[from] StepExecutionError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("step execution {0} not found")]
    NotFound(Uuid),
}

impl AppError {
    /// Código de salida del proceso: 1 si el tasklet falló, 2 para fallas de
    /// almacenamiento o configuración.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Step(StepExecutionError::Critical(_)) => 1,
            _ => 2,
        }
    }
}
