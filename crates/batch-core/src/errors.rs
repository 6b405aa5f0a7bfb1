//! Errores del core.
//!
//! Sólo dos categorías salen del runner:
//! - `BatchCriticalError`: el tasklet falló y el registro quedó `Failed` de
//!   forma durable. Siempre lleva la causa original.
//! - `RepositoryError`: el almacenamiento falló. Nunca se envuelve en la
//!   categoría crítica.

use thiserror::Error;

/// Error arbitrario devuelto por un tasklet.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Fallo transitorio (conexión, pool, conflicto de serialización).
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    /// El backend rechazó el registro (constraint, datos inválidos).
    #[error("repository rejected step execution: {0}")]
    Rejected(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Fallo del tasklet, tal como lo captura el runner.
#[derive(Debug, Error)]
pub enum TaskletFailure {
    #[error("{0}")]
    Error(#[source] BoxError),
    #[error("tasklet panicked: {0}")]
    Panicked(String),
}

impl TaskletFailure {
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Falla crítica de ejecución de un step.
#[derive(Debug, Error)]
#[error("critical failure executing step '{step_name}': {cause}")]
pub struct BatchCriticalError {
    step_name: String,
    #[source]
    cause: TaskletFailure,
}

impl BatchCriticalError {
    pub fn new(step_name: impl Into<String>, cause: TaskletFailure) -> Self {
        Self { step_name: step_name.into(),
               cause }
    }

    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    /// Causa original reportada por el tasklet.
    pub fn cause(&self) -> &TaskletFailure {
        &self.cause
    }

    pub fn into_cause(self) -> TaskletFailure {
        self.cause
    }
}

/// Resultado de error de `execute`.
#[derive(Debug, Error)]
pub enum StepExecutionError {
    #[error(transparent)]
    Critical(#[from] BatchCriticalError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl StepExecutionError {
    pub fn as_critical(&self) -> Option<&BatchCriticalError> {
        match self {
            Self::Critical(e) => Some(e),
            Self::Repository(_) => None,
        }
    }

    pub fn as_repository(&self) -> Option<&RepositoryError> {
        match self {
            Self::Repository(e) => Some(e),
            Self::Critical(_) => None,
        }
    }
}
