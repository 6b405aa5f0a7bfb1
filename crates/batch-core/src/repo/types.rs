use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::{BatchStatus, StepExecution};

/// Snapshot de un `StepExecution` registrado en un checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCheckpoint {
    pub seq: u64, // asignado por el repositorio (orden append)
    pub step_execution_id: Uuid,
    pub status: BatchStatus,
    pub snapshot: StepExecution,
    pub ts: DateTime<Utc>, // metadato del repositorio, no del registro
}
