//! In-memory source for tests and offline development.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{EventSource, SourceError, SourceResult};

/// Serves whatever payload it was last given, or a configured failure.
#[derive(Clone)]
pub struct StaticEventSource {
    response: Arc<RwLock<SourceResult<Value>>>,
    fetches: Arc<AtomicUsize>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for StaticEventSource {
    fn default() -> Self {
        Self::new(Value::Array(Vec::new()))
    }
}

impl StaticEventSource {
    pub fn new(payload: Value) -> Self {
        Self {
            response: Arc::new(RwLock::new(Ok(payload))),
            fetches: Arc::new(AtomicUsize::new(0)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the payload returned by subsequent fetches.
    pub fn set_payload(&self, payload: Value) {
        *self.response.write() = Ok(payload);
    }

    /// Make subsequent fetches fail with `error`.
    pub fn fail_with(&self, error: SourceError) {
        *self.response.write() = Err(error);
    }

    /// Hold every subsequent fetch for `delay` before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for StaticEventSource {
    async fn fetch(&self) -> SourceResult<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Capture the answer before sleeping so a delayed fetch returns the
        // payload that was current when it started.
        let response = self.response.read().clone();
        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
