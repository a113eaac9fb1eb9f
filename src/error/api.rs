//! HTTP-facing errors for the message log API.
//!
//! Bodies are deliberately generic; the underlying cause is only logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed schema validation, or the message could not be
    /// stored.
    #[error("Invalid message data")]
    InvalidMessage { reason: String },

    /// Storage could not list messages.
    #[error("Failed to fetch messages")]
    FetchFailed { reason: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidMessage { .. } => StatusCode::BAD_REQUEST,
            ApiError::FetchFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn reason(&self) -> &str {
        match self {
            ApiError::InvalidMessage { reason } | ApiError::FetchFailed { reason } => reason,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status(), reason = self.reason(), "{}", self);
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
