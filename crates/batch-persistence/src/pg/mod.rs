//! Implementación Postgres (Diesel) de `JobRepository`.
//!
//! Objetivo general del módulo:
//! - Registrar de forma durable cada checkpoint de un `StepExecution` con
//!   paridad 1:1 respecto al repositorio en memoria del core.
//! - Aislar el mapeo dominio ↔ filas de DB fuera de `batch-core`.
//!
//! Cada `save_or_update` corre en UNA transacción read-write que:
//! - hace upsert de la fila vigente en `step_execution` (incrementa
//!   `version` en cada actualización);
//! - agrega el snapshot completo a `step_execution_checkpoint` (append-only,
//!   orden total por `seq`).
//!
//! Errores transitorios se reintentan con backoff corto.

use std::time::Duration;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::upsert::excluded;
use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use batch_core::{BatchStatus, ExitStatus, JobRepository, RepositoryError, StepExecution};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{step_execution, step_execution_checkpoint};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Al construirlo con `build_pool` se corren las migraciones pendientes (una
/// sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Contrato:
/// - Debe devolver una conexión válida o `PersistenceError::TransientIo` en
///   caso de error.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila para upsert en `step_execution`.
#[derive(Insertable, Debug)]
#[diesel(table_name = step_execution)]
pub struct NewStepExecutionRow<'a> {
    pub id: &'a Uuid,
    pub job_execution_id: &'a Uuid,
    pub step_name: &'a str,
    pub status: &'a str,
    pub exit_code: &'a str,
    pub exit_description: &'a str,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

/// Fila mapeada de `step_execution` para lecturas.
///
/// - `version`: 0 tras el primer save, +1 en cada actualización.
/// - `last_updated`: momento del último save.
#[derive(Queryable, Debug, Clone)]
pub struct StepExecutionRow {
    pub id: Uuid,
    pub job_execution_id: Uuid,
    pub step_name: String,
    pub status: String,
    pub exit_code: String,
    pub exit_description: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub version: i32,
    pub last_updated: DateTime<Utc>,
}

impl StepExecutionRow {
    pub fn into_step_execution(self) -> Result<StepExecution, PersistenceError> {
        let status: BatchStatus = self.status.parse().map_err(PersistenceError::InvalidRow)?;
        Ok(StepExecution { id: self.id,
                           job_execution_id: self.job_execution_id,
                           step_name: self.step_name,
                           status,
                           exit_status: ExitStatus::new(self.exit_code).with_description(self.exit_description),
                           start_time: self.start_time,
                           end_time: self.end_time })
    }
}

/// Fila para insertar en `step_execution_checkpoint`.
#[derive(Insertable, Debug)]
#[diesel(table_name = step_execution_checkpoint)]
pub struct NewCheckpointRow<'a> {
    pub step_execution_id: &'a Uuid,
    pub status: &'a str,
    pub payload: &'a Value,
}

/// Fila mapeada de `step_execution_checkpoint`.
///
/// `payload` guarda el `StepExecution` completo serializado al momento del
/// checkpoint.
#[derive(Queryable, Debug, Clone)]
pub struct CheckpointRow {
    pub seq: i64,
    pub step_execution_id: Uuid,
    pub status: String,
    pub ts: DateTime<Utc>,
    pub payload: Value,
}

impl CheckpointRow {
    pub fn snapshot(&self) -> Result<StepExecution, PersistenceError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| PersistenceError::InvalidRow(format!("checkpoint {}: {e}", self.seq)))
    }
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes llegan como Unknown con texto; best-effort sin
        // acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

const MAX_RETRIES: u32 = 3;

/// Retry simple con backoff lineal (15ms, 30ms, 45ms).
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < MAX_RETRIES => {
                let delay_ms = 15 * u64::from(attempts + 1);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Implementación Postgres de `JobRepository`.
pub struct PgJobRepository<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgJobRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Guarda el estado actual y su checkpoint. Devuelve la `version` vigente
    /// de la fila.
    pub fn save(&self, execution: &StepExecution) -> Result<i32, PersistenceError> {
        debug!("save:start id={} status={}", execution.id, execution.status);
        let payload = serde_json::to_value(execution).map_err(|e| PersistenceError::Unknown(format!("ser: {e}")))?;
        let status = execution.status.as_str();
        let version = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    let row = NewStepExecutionRow { id: &execution.id,
                                                    job_execution_id: &execution.job_execution_id,
                                                    step_name: &execution.step_name,
                                                    status,
                                                    exit_code: &execution.exit_status.exit_code,
                                                    exit_description: &execution.exit_status.exit_description,
                                                    start_time: execution.start_time,
                                                    end_time: execution.end_time,
                                                    last_updated: Utc::now() };
                    let version: i32 = diesel::insert_into(step_execution::table)
                        .values(&row)
                        .on_conflict(step_execution::id)
                        .do_update()
                        .set((step_execution::status.eq(excluded(step_execution::status)),
                              step_execution::exit_code.eq(excluded(step_execution::exit_code)),
                              step_execution::exit_description.eq(excluded(step_execution::exit_description)),
                              step_execution::start_time.eq(excluded(step_execution::start_time)),
                              step_execution::end_time.eq(excluded(step_execution::end_time)),
                              step_execution::version.eq(step_execution::version + 1),
                              step_execution::last_updated.eq(excluded(step_execution::last_updated))))
                        .returning(step_execution::version)
                        .get_result(tx_conn)?;

                    diesel::insert_into(step_execution_checkpoint::table)
                        .values(NewCheckpointRow { step_execution_id: &execution.id,
                                                   status,
                                                   payload: &payload })
                        .execute(tx_conn)?;

                    Ok::<i32, diesel::result::Error>(version)
                })
                .map_err(PersistenceError::from)
        })?;
        debug!("save:done id={} status={} version={version}", execution.id, execution.status);
        Ok(version)
    }

    /// Lee la fila vigente de una ejecución.
    pub fn find_row(&self, id: Uuid) -> Result<Option<StepExecutionRow>, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            step_execution::table.find(id)
                                 .first::<StepExecutionRow>(&mut conn)
                                 .optional()
                                 .map_err(PersistenceError::from)
        })
    }

    /// Lee el último estado guardado de una ejecución.
    pub fn find(&self, id: Uuid) -> Result<Option<StepExecution>, PersistenceError> {
        self.find_row(id)?.map(StepExecutionRow::into_step_execution).transpose()
    }

    /// Lista los checkpoints de una ejecución ordenados por `seq`.
    pub fn list_checkpoints(&self, id: Uuid) -> Result<Vec<CheckpointRow>, PersistenceError> {
        debug!("list_checkpoints:start id={id}");
        let rows: Vec<CheckpointRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            step_execution_checkpoint::table.filter(step_execution_checkpoint::step_execution_id.eq(id))
                                            .order(step_execution_checkpoint::seq.asc())
                                            .load(&mut conn)
                                            .map_err(PersistenceError::from)
        })?;
        debug!("list_checkpoints:done id={id} count={}", rows.len());
        Ok(rows)
    }

    /// Ejecuciones de un job, en orden de inicio.
    pub fn list_for_job(&self, job_execution_id: Uuid) -> Result<Vec<StepExecution>, PersistenceError> {
        let rows: Vec<StepExecutionRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            step_execution::table.filter(step_execution::job_execution_id.eq(job_execution_id))
                                 .order(step_execution::start_time.asc())
                                 .load(&mut conn)
                                 .map_err(PersistenceError::from)
        })?;
        rows.into_iter().map(StepExecutionRow::into_step_execution).collect()
    }
}

impl<P: ConnectionProvider> JobRepository for PgJobRepository<P> {
    fn save_or_update(&mut self, execution: &StepExecution) -> Result<(), RepositoryError> {
        self.save(execution).map(|_| ()).map_err(RepositoryError::from)
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Tamaños 0 se ajustan a 1; si `min_size > max_size` se usa `min = max`.
/// - Ejecuta migraciones inmediatamente tras el primer `get()`.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), adjusting min=max");
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(validated_min.min(validated_max)))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn retryable_classification() {
        assert!(is_retryable(&PersistenceError::SerializationConflict));
        assert!(is_retryable(&PersistenceError::TransientIo("pool".into())));
        assert!(is_retryable(&PersistenceError::Unknown("ERROR: deadlock detected".into())));
        assert!(!is_retryable(&PersistenceError::Unknown("syntax error".into())));
        assert!(!is_retryable(&PersistenceError::CheckViolation("x".into())));
    }

    #[test]
    fn with_retry_gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let res: Result<(), _> = with_retry(|| {
            calls.set(calls.get() + 1);
            Err(PersistenceError::TransientIo("down".into()))
        });
        assert!(res.is_err());
        assert_eq!(calls.get(), 1 + MAX_RETRIES);
    }

    #[test]
    fn with_retry_does_not_repeat_permanent_errors() {
        let calls = Cell::new(0);
        let res: Result<(), _> = with_retry(|| {
            calls.set(calls.get() + 1);
            Err(PersistenceError::UniqueViolation("dup".into()))
        });
        assert!(matches!(res, Err(PersistenceError::UniqueViolation(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn row_with_unknown_status_is_invalid() {
        let row = StepExecutionRow { id: Uuid::new_v4(),
                                     job_execution_id: Uuid::new_v4(),
                                     step_name: "s".into(),
                                     status: "paused".into(),
                                     exit_code: "UNKNOWN".into(),
                                     exit_description: String::new(),
                                     start_time: None,
                                     end_time: None,
                                     version: 0,
                                     last_updated: Utc::now() };
        assert!(matches!(row.into_step_execution(), Err(PersistenceError::InvalidRow(_))));
    }
}
