//! Error types for the upload gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::handlers::types::ErrorResponse;

/// Errors surfaced by gateway operations.
///
/// Every variant renders as `{"success": false, "message": ...}`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing file, empty filename, disallowed extension or malformed form
    #[error("{0}")]
    Validation(String),

    /// The blob store rejected the call; carries the backend message
    #[error("{0}")]
    Storage(String),

    /// The request body went over the configured upload limit
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("An error occurred: {0}")]
    Unexpected(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Storage(_) | GatewayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            GatewayError::Validation(msg) => debug!("Rejected request: {}", msg),
            GatewayError::PayloadTooLarge(msg) => warn!("Rejected request: {}", msg),
            other => error!("Request failed: {}", other),
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
