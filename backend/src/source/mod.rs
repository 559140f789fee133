//! Upstream event sources.
//!
//! A source hands back the raw JSON payload; normalization happens in
//! [`crate::services::ingest`].

#[cfg(feature = "upstream")]
pub mod http;
pub mod static_source;

use async_trait::async_trait;
use serde_json::Value;

#[cfg(feature = "upstream")]
pub use http::HttpEventSource;
pub use static_source::StaticEventSource;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised while fetching a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Transport error: {message}")]
    Transport { message: String, timed_out: bool },

    /// The upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not JSON.
    #[error("Failed to decode upstream response: {message}")]
    Decode { message: String },

    /// The source is deliberately unavailable.
    #[error("Source unavailable: {message}")]
    Unavailable { message: String },
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Whether a later attempt may succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport { .. } => true,
            SourceError::Status { status, .. } => *status >= 500 || *status == 429,
            SourceError::Decode { .. } => false,
            SourceError::Unavailable { .. } => true,
        }
    }
}

/// Something that can produce the upstream payload.
///
/// Implementations must be `Send + Sync`; the controller shares one source
/// between the poller and on-demand refreshes.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the current payload: an array of events or an object of
    /// per-device arrays.
    async fn fetch(&self) -> SourceResult<Value>;

    /// Short human-readable description for logs and health output.
    fn describe(&self) -> String;
}
