//! Server error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use cairn_auth::IntrospectionError;
use cairn_plugins::BootstrapError;
use cairn_storage::StorageError;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Document store could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A plugin failed to bootstrap or start.
    #[error("plugin startup failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Bearer token introspector could not be built.
    #[error("token introspection setup failed: {0}")]
    Introspection(#[from] IntrospectionError),

    /// Listener or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials missing or rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
