//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::controller::RefreshError;
use crate::source::SourceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Refreshing from upstream failed
    Refresh(RefreshError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Refresh(e) => {
                let msg = e.to_string();
                match e {
                    RefreshError::Source(SourceError::Transport { timed_out: true, .. }) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        ApiError::new("UPSTREAM_TIMEOUT", msg),
                    ),
                    RefreshError::Source(source) => {
                        let retryable = source.is_retryable();
                        (
                            StatusCode::BAD_GATEWAY,
                            ApiError::new("UPSTREAM_ERROR", msg)
                                .with_details(format!("retryable={}", retryable)),
                        )
                    }
                    RefreshError::Payload(_) => (
                        StatusCode::BAD_GATEWAY,
                        ApiError::new("MALFORMED_PAYLOAD", msg),
                    ),
                }
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RefreshError> for AppError {
    fn from(err: RefreshError) -> Self {
        AppError::Refresh(err)
    }
}
