use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::StepCheckpoint;
use crate::errors::RepositoryError;
use crate::step::{BatchStatus, StepExecution};

/// Destino de los checkpoints de un `StepExecution`.
///
/// Contrato:
/// - `save_or_update` registra los valores actuales del registro (inserta la
///   primera vez, actualiza después).
/// - Puede llamarse varias veces con el mismo registro en evolución; la última
///   llamada refleja siempre los valores más recientes.
/// - Un solo escritor por registro.
pub trait JobRepository {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError>;
}

impl<R: JobRepository + ?Sized> JobRepository for Box<R> {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError> {
        (**self).save_or_update(execution)
    }
}

impl<R: JobRepository + ?Sized> JobRepository for &mut R {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError> {
        (**self).save_or_update(execution)
    }
}

/// Repositorio en memoria: último snapshot por id más un log append-only de
/// checkpoints.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    executions: HashMap<Uuid, StepExecution>,
    checkpoints: Vec<StepCheckpoint>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Último estado guardado de una ejecución.
    pub fn get(&self, id: Uuid) -> Option<&StepExecution> {
        self.executions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.executions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    /// Checkpoints de una ejecución en orden de llegada.
    pub fn checkpoints_for(&self, id: Uuid) -> Vec<StepCheckpoint> {
        self.checkpoints
            .iter()
            .filter(|c| c.step_execution_id == id)
            .cloned()
            .collect()
    }

    /// Secuencia de estados guardados para una ejecución.
    pub fn status_history(&self, id: Uuid) -> Vec<BatchStatus> {
        self.checkpoints
            .iter()
            .filter(|c| c.step_execution_id == id)
            .map(|c| c.status)
            .collect()
    }
}

impl JobRepository for InMemoryJobRepository {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError> {
        let seq = self.checkpoints.len() as u64;
        self.checkpoints.push(StepCheckpoint { seq,
                                               step_execution_id: execution.id,
                                               status: execution.status,
                                               snapshot: execution.clone(),
                                               ts: Utc::now() });
        self.executions.insert(execution.id, execution.clone());
        Ok(())
    }
}
