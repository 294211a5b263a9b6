//! API error types and response mapping.
//!
//! The submission endpoint's wire contract is status-only: callers never
//! read a body, so [`IntoResponse`] emits the mapped status with an empty
//! body and routes the detail to `tracing` instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error as ThisError;

use crate::db::errors::DbError;

/// API-level errors.
#[derive(ThisError, Debug)]
pub enum Error {
    /// The request body could not be decoded as a form submission
    #[error("{message}")]
    BadRequest { message: String },

    /// A database connection could not be acquired
    #[error("Storage backend unavailable: {source}")]
    StorageUnavailable {
        #[source]
        source: sqlx::Error,
    },

    /// An internal invariant does not hold
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// The persistence statement failed
    #[error(transparent)]
    Database(#[from] DbError),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map the error to the status code callers key on.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::StorageUnavailable { .. } => StatusCode::BAD_GATEWAY,
            // Non-standard code for a failed persistence statement; shipped
            // game clients check for exactly 513, so it stays.
            Error::Database(_) => {
                StatusCode::from_u16(513).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::StorageUnavailable { .. } => {
                tracing::error!("Storage backend unavailable: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Statement failed: {}", self);
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        self.status_code().into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
