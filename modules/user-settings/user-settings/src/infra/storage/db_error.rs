use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::domain::store::StorageError;

/// Classify a driver error for the row keyed by `id`.
///
/// Pool and connection failures are transient; constraint and query errors are not.
#[must_use]
pub fn map_db_err(id: Uuid, err: &DbErr) -> StorageError {
    if let Some(SqlErr::ForeignKeyConstraintViolation(_)) = err.sql_err() {
        return StorageError::MissingPrincipal(id);
    }
    match err {
        DbErr::Conn(e) => StorageError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => StorageError::Connection(e.to_string()),
        other => StorageError::Query(other.to_string()),
    }
}

/// Whether the error is the primary key already being taken.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
