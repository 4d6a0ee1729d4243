//! Error types surfaced by tracker operations and the HTTP layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Failure of a tracker operation.
///
/// Malformed numeric input is not represented here: it is always coerced to a
/// safe default during normalization.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request was rejected before any state changed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The in-memory mutation was applied but the durable write failed.
    ///
    /// Memory and disk disagree until the next successful write.
    #[error("failed to persist state: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// HTTP status used when this error reaches a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
