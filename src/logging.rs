//! Inicialización de logging.
//!
//! Los crates de librería emiten por la fachada `log`; el subscriber de
//! `tracing-subscriber` también recoge esos registros.

use tracing_subscriber::EnvFilter;

/// Instala el subscriber global. Llamadas repetidas no tienen efecto.
pub fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter)
                                     .with_target(true)
                                     .with_writer(std::io::stderr)
                                     .try_init();
}
