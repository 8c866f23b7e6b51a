//! Custom error types for the common library
//!
//! This module defines the database error type shared by every repository
//! in the workspace.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[from] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A stored value could not be decoded into its domain type
    #[error("Database decode error: {0}")]
    Decode(String),
}

impl DatabaseError {
    /// Name of the unique constraint this error violated, if any.
    pub fn unique_violation(&self) -> Option<&str> {
        match self {
            DatabaseError::Query(SqlxError::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Some(db_err.constraint().unwrap_or("unknown"))
            }
            _ => None,
        }
    }

    /// True when the error violated the named unique constraint.
    pub fn violates(&self, constraint: &str) -> bool {
        self.unique_violation() == Some(constraint)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        let err = DatabaseError::Query(SqlxError::RowNotFound);
        assert_eq!(err.unique_violation(), None);
        assert!(!err.violates("uq_users_email"));

        let err = DatabaseError::Configuration("bad url".to_string());
        assert_eq!(err.unique_violation(), None);
    }

    #[test]
    fn display_includes_context() {
        let err = DatabaseError::Decode("unknown booking status 'lost'".to_string());
        assert_eq!(
            err.to_string(),
            "Database decode error: unknown booking status 'lost'"
        );
    }
}
