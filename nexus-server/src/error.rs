//! Common error types for nexus-server.
//!
//! This module provides a centralized Error enum using thiserror, with an
//! axum `IntoResponse` impl so handlers can bubble failures with `?` and
//! clients always receive a `{"error": ...}` JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for nexus-server operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required credential or setting is missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// An upstream provider was unreachable, timed out, or returned a
    /// non-success status
    #[error("{0}")]
    Upstream(String),

    /// Stats store I/O failure
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The stats record was read before initialization
    #[error("Stats record not found")]
    StatsMissing,
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON error body returned on every failure path.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Storage(_) | Error::StatsMissing => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
