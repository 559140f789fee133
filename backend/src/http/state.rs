//! Application state for the HTTP server.

use std::sync::Arc;

use crate::controller::DashboardController;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardController>,
}

impl AppState {
    pub fn new(controller: Arc<DashboardController>) -> Self {
        Self { controller }
    }
}
