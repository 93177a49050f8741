//! Mapping of store errors into domain errors
//!
//! Raw driver messages end up in `DomainError::Database`, which the HTTP
//! layer never shows to clients.

use sea_orm::{DbErr, RuntimeErr, SqlErr};

use crate::error::DomainError;

/// SQLSTATE raised when `lock_timeout` expires
const LOCK_NOT_AVAILABLE: &str = "55P03";

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err))) => {
            db_err.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

/// Map any store error; lock timeouts become retryable `Timeout`s
pub(crate) fn db_error(err: DbErr) -> DomainError {
    if sqlstate(&err).as_deref() == Some(LOCK_NOT_AVAILABLE) {
        tracing::warn!(error = %err, "Row lock wait exceeded the deadline");
        return DomainError::Timeout("Timed out waiting for a row lock".to_string());
    }
    DomainError::Database(err.to_string())
}

/// Map a unique-constraint violation to `conflict`, anything else as [`db_error`]
pub(crate) fn on_unique_violation(
    err: DbErr,
    conflict: impl FnOnce() -> DomainError,
) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict(),
        _ => db_error(err),
    }
}

/// Map a foreign-key violation to `restricted`, anything else as [`db_error`]
pub(crate) fn on_foreign_key_violation(
    err: DbErr,
    restricted: impl FnOnce() -> DomainError,
) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => restricted(),
        _ => db_error(err),
    }
}

/// A stored enum value that no longer parses
pub(crate) fn corrupt_column(table: &str, column: &str, value: &str) -> DomainError {
    DomainError::Internal(format!(
        "Unexpected value '{}' in {}.{}",
        value, table, column
    ))
}
