//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone `AppConfig`.
use std::env;

use batch_persistence::DbConfig;

use crate::errors::AppError;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Backend donde se guardan los checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryBackend {
    #[default]
    Memory,
    Postgres,
}

impl std::str::FromStr for RepositoryBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "pg" => Ok(Self::Postgres),
            other => Err(AppError::Config(format!("unknown BATCHFLOW_REPOSITORY '{other}' (expected memory|postgres)"))),
        }
    }
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub repository: RepositoryBackend,
    /// Sólo presente con backend `Postgres`.
    pub database: Option<DbConfig>,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        batch_persistence::init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let repository = match lookup("BATCHFLOW_REPOSITORY") {
            Some(v) => v.parse()?,
            None => RepositoryBackend::default(),
        };
        let database = match repository {
            RepositoryBackend::Memory => None,
            RepositoryBackend::Postgres => Some(DbConfig::from_lookup(&lookup)?),
        };
        let log_filter = lookup("BATCHFLOW_LOG").or_else(|| lookup("RUST_LOG"))
                                                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Ok(Self { repository,
                  database,
                  log_filter })
    }
}
