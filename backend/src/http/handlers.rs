//! HTTP handlers for the REST API.
//!
//! Each handler reads from or drives the [`DashboardController`](crate::controller::DashboardController).

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{FilterParams, FilterResponse, HealthResponse, RefreshResponse};
use super::error::AppError;
use super::state::AppState;
use crate::controller::Notification;
use crate::models::{Event, FilterQuery};
use crate::services::{DashboardView, DeltaPoint, Stats, TimelinePoint};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let controller = &state.controller;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source: controller.source_description(),
        event_count: controller.events().len(),
        last_updated: controller.last_updated(),
    }))
}

// =============================================================================
// Dashboard View
// =============================================================================

/// GET /v1/dashboard
///
/// The view for the current filter.
pub async fn get_dashboard(State(state): State<AppState>) -> HandlerResult<DashboardView> {
    Ok(Json(state.controller.view().as_ref().clone()))
}

/// GET /v1/dashboard/query
///
/// A view for the selection in the query string. The stored filter is left
/// alone.
pub async fn query_dashboard(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> HandlerResult<DashboardView> {
    let query = params.into_query().map_err(AppError::BadRequest)?;
    Ok(Json(state.controller.query_view(&query)))
}

/// GET /v1/stats
pub async fn get_stats(State(state): State<AppState>) -> HandlerResult<Stats> {
    Ok(Json(state.controller.view().stats))
}

/// GET /v1/timeline
pub async fn get_timeline(State(state): State<AppState>) -> HandlerResult<Vec<TimelinePoint>> {
    Ok(Json(state.controller.view().timeline.clone()))
}

/// GET /v1/devices/latest
pub async fn get_latest_by_device(State(state): State<AppState>) -> HandlerResult<Vec<Event>> {
    Ok(Json(state.controller.view().latest_by_device.clone()))
}

/// GET /v1/deltas
pub async fn get_recent_deltas(State(state): State<AppState>) -> HandlerResult<Vec<DeltaPoint>> {
    Ok(Json(state.controller.view().recent_deltas.clone()))
}

/// GET /v1/activity
pub async fn get_activity(State(state): State<AppState>) -> HandlerResult<Vec<Event>> {
    Ok(Json(state.controller.view().activity.clone()))
}

// =============================================================================
// Filter
// =============================================================================

/// GET /v1/filter
pub async fn get_filter(State(state): State<AppState>) -> HandlerResult<FilterQuery> {
    Ok(Json(state.controller.filter()))
}

/// PUT /v1/filter
///
/// Queue a filter change. Rapid successive changes are debounced, so the
/// view reflects the last one shortly after the burst ends.
pub async fn set_filter(
    State(state): State<AppState>,
    Json(params): Json<FilterParams>,
) -> HandlerResult<FilterResponse> {
    let query = params.into_query().map_err(AppError::BadRequest)?;
    state.controller.request_filter(query.clone());
    Ok(Json(FilterResponse {
        query,
        pending: true,
    }))
}

// =============================================================================
// Refresh & Notifications
// =============================================================================

/// POST /v1/refresh
pub async fn refresh(State(state): State<AppState>) -> HandlerResult<RefreshResponse> {
    let outcome = state.controller.refresh().await?;
    Ok(Json(RefreshResponse {
        outcome,
        last_updated: state.controller.last_updated(),
    }))
}

/// GET /v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
) -> HandlerResult<Vec<Notification>> {
    Ok(Json(state.controller.notifications()))
}

/// DELETE /v1/notifications/{id}
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<axum::http::StatusCode, AppError> {
    if state.controller.dismiss_notification(id) {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {} not found", id)))
    }
}
