//! Carga de configuración de conexión desde variables de entorno.
//! Usa convención `DATABASE_URL` y parámetros opcionales de pool.

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use crate::error::PersistenceError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_MIN_CONNECTIONS: u32 = 2;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, PersistenceError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración desde una fuente arbitraria de variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PersistenceError>
        where F: Fn(&str) -> Option<String>
    {
        let url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty())
                                        .ok_or_else(|| PersistenceError::Config("DATABASE_URL is not set".into()))?;
        let min_connections = parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        Ok(Self { url,
                  min_connections,
                  max_connections })
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u32) -> Result<u32, PersistenceError>
    where F: Fn(&str) -> Option<String>
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => match v.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(PersistenceError::Config(format!("{key} must be a positive integer, got '{v}'"))),
        },
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_pool_sizes_missing() {
        let cfg = DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/batch")])).unwrap();
        assert_eq!(cfg.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = DbConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, PersistenceError::Config(_)));
    }

    #[test]
    fn invalid_pool_size_is_rejected() {
        let err = DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("DATABASE_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: DATABASE_MAX_CONNECTIONS must be a positive integer, got 'many'");
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("DATABASE_MIN_CONNECTIONS", "0")])).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: DATABASE_MIN_CONNECTIONS must be a positive integer, got '0'");

        let cfg = DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("DATABASE_MIN_CONNECTIONS", "1")])).unwrap();
        assert_eq!(cfg.min_connections, 1);
    }
}
