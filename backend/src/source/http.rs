//! HTTP source polling the counting API with reqwest.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{EventSource, SourceError, SourceResult};

/// Longest response body excerpt kept in a status error.
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEventSource {
    /// Build a source for `endpoint` whose requests give up after `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode {
                message: err.to_string(),
            }
        } else {
            SourceError::Transport {
                timed_out: err.is_timeout(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch(&self) -> SourceResult<Value> {
        log::debug!("Fetching events from {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<empty response>".to_string());
            let excerpt: String = body.trim().chars().take(BODY_EXCERPT_LEN).collect();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: excerpt,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode {
            message: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }
}
