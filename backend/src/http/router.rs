//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The dashboard page may be served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Views
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/dashboard/query", get(handlers::query_dashboard))
        .route("/stats", get(handlers::get_stats))
        .route("/timeline", get(handlers::get_timeline))
        .route("/devices/latest", get(handlers::get_latest_by_device))
        .route("/deltas", get(handlers::get_recent_deltas))
        .route("/activity", get(handlers::get_activity))
        // Filter
        .route("/filter", get(handlers::get_filter).put(handlers::set_filter))
        // Refresh & notifications
        .route("/refresh", post(handlers::refresh))
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications/{id}", delete(handlers::dismiss_notification));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
