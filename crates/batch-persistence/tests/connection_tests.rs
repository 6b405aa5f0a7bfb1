//! Pruebas básicas de configuración y pool (requiere DATABASE_URL válido en entorno).

use batch_persistence::{build_dev_pool_from_env, build_pool, DbConfig};
use diesel::connection::SimpleConnection;

#[test]
fn create_pool_from_env() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL no definido: omitiendo test");
        return;
    }
    let cfg = DbConfig::from_env().expect("config");
    let pool = build_pool(&cfg.url, cfg.min_connections, cfg.max_connections).expect("pool");
    let mut conn = pool.get().expect("conn");
    conn.batch_execute("SELECT 1;").expect("select 1");
    // las migraciones crearon ambas tablas
    conn.batch_execute("SELECT count(*) FROM step_execution; SELECT count(*) FROM step_execution_checkpoint;")
        .expect("tables exist");
}

#[test]
fn dev_pool_from_env_is_migrated() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL no definido: omitiendo test");
        return;
    }
    let pool = build_dev_pool_from_env().expect("dev pool");
    let mut conn = pool.get().expect("conn");
    conn.batch_execute("SELECT count(*) FROM step_execution_checkpoint;")
        .expect("migrations applied");
}
