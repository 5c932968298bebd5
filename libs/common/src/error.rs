//! Error types for the journal store.

use sqlx::{Error as SqlxError, migrate::MigrateError};
use thiserror::Error;

/// Failures raised while opening, migrating or probing the journal database
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not open a connection
    #[error("could not open database: {0}")]
    Connection(#[source] SqlxError),

    /// The embedded schema migrations could not be applied
    #[error("schema migration failed: {0}")]
    Migration(#[from] MigrateError),

    /// The configured URL or pool limits are unusable
    #[error("invalid database configuration: {0}")]
    Configuration(String),
}

/// Whether a raw sqlx error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db) if db.is_unique_violation())
}

/// Whether a raw sqlx error is a FOREIGN KEY constraint violation
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db) if db.is_foreign_key_violation())
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
