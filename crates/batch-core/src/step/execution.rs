//! Registro mutable de una ejecución de step.
//!
//! Rol en el flujo:
//! - El llamador crea el `StepExecution` y lo entrega (`&mut`) al runner.
//! - El runner sólo avanza `status`, fija `start_time`/`end_time` y
//!   `exit_status`; nunca cambia la identidad.
//! - Al volver, el registro pertenece de nuevo al llamador.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BatchStatus, ExitStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExecution {
    pub id: Uuid,
    pub job_execution_id: Uuid, // correlación con la corrida del job (pass-through)
    pub step_name: String,
    pub status: BatchStatus,
    pub exit_status: ExitStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl StepExecution {
    /// Crea un registro `Unstarted` con id nuevo.
    pub fn new(step_name: impl Into<String>, job_execution_id: Uuid) -> Self {
        Self::with_id(Uuid::new_v4(), step_name, job_execution_id)
    }

    pub fn with_id(id: Uuid, step_name: impl Into<String>, job_execution_id: Uuid) -> Self {
        Self { id,
               job_execution_id,
               step_name: step_name.into(),
               status: BatchStatus::Unstarted,
               exit_status: ExitStatus::unknown(),
               start_time: None,
               end_time: None }
    }

    /// Duración de la ejecución, si ya terminó.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
