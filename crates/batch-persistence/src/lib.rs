//! batch-persistence
//!
//! Implementación Postgres (Diesel + r2d2) del `JobRepository` de
//! `batch-core`.
//!
//! Módulos:
//! - `pg`: repositorio, pool y proveedor de conexiones.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, CheckpointRow, ConnectionProvider, PgJobRepository, PgPool, PoolProvider};
