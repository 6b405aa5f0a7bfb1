//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas del dominio de persistencia
//! y éstas a `RepositoryError` del core.

use batch_core::RepositoryError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("invalid stored row: {0}")]
    InvalidRow(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(info.message().to_string()),
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::ForeignKeyViolation => Self::ForeignKeyViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::InvalidRow(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            DieselError::RollbackErrorOnCommit { rollback_error, commit_error } => {
                Self::Unknown(format!("rollback={rollback_error}; commit={commit_error}"))
            }
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<PersistenceError> for RepositoryError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::SerializationConflict | PersistenceError::TransientIo(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            PersistenceError::UniqueViolation(_)
            | PersistenceError::CheckViolation(_)
            | PersistenceError::ForeignKeyViolation(_)
            | PersistenceError::InvalidRow(_) => RepositoryError::Rejected(err.to_string()),
            PersistenceError::NotFound | PersistenceError::Config(_) | PersistenceError::Unknown(_) => {
                RepositoryError::Storage(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_map_to_unavailable() {
        let err: RepositoryError = PersistenceError::TransientIo("pool timed out".into()).into();
        assert_eq!(err,
                   RepositoryError::Unavailable("transient IO / connection pool error: pool timed out".into()));
        let err: RepositoryError = PersistenceError::SerializationConflict.into();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[test]
    fn constraint_errors_map_to_rejected() {
        let err: RepositoryError = PersistenceError::CheckViolation("step_execution_end_after_start".into()).into();
        assert_eq!(err, RepositoryError::Rejected("check violation: step_execution_end_after_start".into()));
    }

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        assert!(matches!(PersistenceError::from(DieselError::NotFound), PersistenceError::NotFound));
    }
}
