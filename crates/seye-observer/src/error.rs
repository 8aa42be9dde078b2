//! Error types for the track feed server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use seye_core::command::CommandError;
use seye_core::store::StoreError;

/// Errors that can occur in the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body failed validation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<CommandError> for ObserverError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Validation { reason } => Self::Validation(reason),
            CommandError::Store(e @ StoreError::DuplicateId { .. }) => Self::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
