//! Storage-layer error types.

use std::time::Duration;
use thiserror::Error;

/// SQLSTATE raised by `FOR UPDATE NOWAIT` when the row is already locked
const LOCK_NOT_AVAILABLE: &str = "55P03";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row is exclusively locked by another in-flight transaction
    #[error("Row is locked by another transaction")]
    LockNotAvailable,

    /// Unique key already present
    #[error("Unique constraint violated")]
    UniqueViolation,

    /// A table constraint rejected the write
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Whether the failure is a contention signal rather than a broken store.
    ///
    /// Row locks are taken with `NOWAIT`, so a statement that times out was
    /// never waiting on a lock and counts as a broken store.
    pub fn is_contention(&self) -> bool {
        matches!(self, StoreError::LockNotAvailable)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => {
                StoreError::LockNotAvailable
            }
            Some(UNIQUE_VIOLATION) => StoreError::UniqueViolation,
            Some(CHECK_VIOLATION) => StoreError::ConstraintViolation(
                err.as_database_error()
                    .map(|db_err| db_err.message().to_string())
                    .unwrap_or_default(),
            ),
            _ => StoreError::Database(err),
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
