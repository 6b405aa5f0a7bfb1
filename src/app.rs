//! Operaciones de la CLI, separadas de `main` para poder probarlas.

use batch_core::{InMemoryJobRepository, JobRepository, Step, StepExecution, StepExecutionError, TaskletStep};
use batch_persistence::{build_pool, PgJobRepository, PoolProvider};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::{AppConfig, RepositoryBackend};
use crate::errors::AppError;
use crate::tasklets::CommandTasklet;

/// Construye el repositorio configurado.
pub fn build_repository(config: &AppConfig) -> Result<Box<dyn JobRepository>, AppError> {
    match config.repository {
        RepositoryBackend::Memory => Ok(Box::new(InMemoryJobRepository::new())),
        RepositoryBackend::Postgres => Ok(Box::new(postgres_repository(config)?)),
    }
}

fn postgres_repository(config: &AppConfig) -> Result<PgJobRepository<PoolProvider>, AppError> {
    let db = config.database
                   .as_ref()
                   .ok_or_else(|| AppError::Config("postgres backend requires DATABASE_URL".into()))?;
    let pool = build_pool(&db.url, db.min_connections, db.max_connections)?;
    Ok(PgJobRepository::new(PoolProvider { pool }))
}

/// Ejecuta `tasklet` como step `step_name` del job `job_execution_id`.
///
/// Devuelve el registro final junto al resultado del step: el registro es
/// válido (terminal) aunque el step haya fallado.
pub fn run_step<R>(step_name: &str,
                   job_execution_id: Uuid,
                   tasklet: CommandTasklet,
                   repository: R)
                   -> (StepExecution, Result<(), StepExecutionError>)
    where R: JobRepository
{
    let mut step = TaskletStep::new(step_name, tasklet, repository);
    let mut execution = StepExecution::new(step.name().to_string(), job_execution_id);
    let result = step.execute(&mut execution);
    (execution, result)
}

/// Registro vigente y checkpoints de una ejecución guardada en Postgres.
pub fn show_step(config: &AppConfig, id: Uuid) -> Result<Value, AppError> {
    if config.repository != RepositoryBackend::Postgres {
        return Err(AppError::Config("show requires BATCHFLOW_REPOSITORY=postgres".into()));
    }
    let repo = postgres_repository(config)?;
    let execution = repo.find(id)?.ok_or(AppError::NotFound(id))?;
    let checkpoints: Vec<Value> = repo.list_checkpoints(id)?
                                      .into_iter()
                                      .map(|c| json!({ "seq": c.seq, "status": c.status, "ts": c.ts }))
                                      .collect();
    Ok(json!({ "execution": execution, "checkpoints": checkpoints }))
}
