//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use fey_core::error::FeyError;

/// API error type.
///
/// Renders as `{"error": ..., "details": ...}`; `details` is omitted when absent.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    /// Bad request error.
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Internal server error.
    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Attaches a detail string, such as the underlying cause.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The top-level error message.
    pub fn message(&self) -> &str {
        &self.error
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<FeyError> for ApiError {
    fn from(err: FeyError) -> Self {
        match &err {
            FeyError::ValidationError(_) => ApiError::bad_request(err.to_string()),
            FeyError::ConfigError(_) => {
                tracing::error!(error = %err, "Configuration error");
                ApiError::internal("Configuration error")
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
