//! SQLx error mapping for the Postgres repositories

use gym_core::error::DomainError;
use sqlx::Error as SqlxError;

pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Unique-constraint hits become the caller's conflict error
/// (duplicate member code, duplicate invoice number); anything else is a
/// database failure.
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => on_unique(),
        _ => map_db_error(e),
    }
}
