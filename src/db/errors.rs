//! Database error types.
//!
//! Wraps `sqlx::Error` into the small taxonomy the API layer maps onto
//! response codes. Constraint details are captured where the driver reports
//! them so logs can say which key collided.

use thiserror::Error;

/// Errors arising from database operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// No row matched the query
    #[error("Entity not found")]
    NotFound,

    /// A unique constraint was violated
    #[error("Unique constraint violation: {message}")]
    UniqueViolation {
        /// Name of the violated constraint, if the driver reported it
        constraint: Option<String>,
        /// Table the constraint lives on
        table: Option<String>,
        /// Driver-supplied message
        message: String,
    },

    /// Any other database error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation {
                    constraint: db_err.constraint().map(|s| s.to_string()),
                    table: db_err.table().map(|s| s.to_string()),
                    message: db_err.message().to_string(),
                }
            }
            err => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
