//! Dashboard controller.
//!
//! Owns the dashboard state and keeps it current: it fetches from an
//! [`EventSource`], normalizes the payload, and recomputes the view for the
//! active filter. Refreshes race freely; each one takes a ticket and only
//! the newest completion is applied. The background tasks started by
//! [`DashboardController::spawn`] live in [`poller`].

pub mod poller;
pub mod state;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::config::DashboardConfig;
use crate::error::{ConfigError, CoreError};
use crate::models::{Event, FilterQuery};
use crate::services::{build_view, normalize, payload_fingerprint, DashboardView, ViewSettings};
use crate::source::{EventSource, SourceError};

pub use poller::ControllerHandle;
pub use state::{DashboardState, Notification, NotificationLevel};

/// Why a refresh failed. The previous data is kept in either case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Payload(#[from] CoreError),
}

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// New events were stored and the view recomputed.
    Applied { event_count: usize },
    /// The payload matched the stored one.
    Unchanged,
    /// A newer refresh completed first; this result was dropped.
    Stale,
    /// Another fetch was in flight, nothing was done.
    Skipped,
}

/// Controller tuning derived from configuration.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub view: ViewSettings,
    pub excluded: HashSet<String>,
    pub refresh_interval: Duration,
    pub debounce: Duration,
    pub notification_ttl: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            view: ViewSettings::from_config(config)?,
            excluded: config.excluded_devices(),
            refresh_interval: config.refresh_interval(),
            debounce: config.debounce_delay(),
            notification_ttl: config.notification_ttl(),
        })
    }

    fn timezone(&self) -> Tz {
        self.view.resolver.timezone()
    }
}

pub struct DashboardController {
    source: Arc<dyn EventSource>,
    settings: ControllerSettings,
    state: RwLock<DashboardState>,
    next_ticket: AtomicU64,
    fetch_guard: Mutex<()>,
    filter_tx: watch::Sender<FilterQuery>,
}

impl DashboardController {
    pub fn new(source: Arc<dyn EventSource>, settings: ControllerSettings) -> Self {
        let query = FilterQuery::default();
        let now = Utc::now().with_timezone(&settings.timezone()).fixed_offset();
        let state = DashboardState::new(query.clone(), DashboardView::empty(query.clone(), now));
        let (filter_tx, _) = watch::channel(query);
        Self {
            source,
            settings,
            state: RwLock::new(state),
            next_ticket: AtomicU64::new(0),
            fetch_guard: Mutex::new(()),
            filter_tx,
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Current time in the configured timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.settings.timezone()).fixed_offset()
    }

    /// Fetch, normalize and apply the upstream payload.
    ///
    /// Runs regardless of other refreshes in flight. A completion is applied
    /// only if no refresh that started later has been applied already.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let payload = match self.source.fetch().await {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("Refresh #{} failed to fetch: {}", ticket, err);
                self.notify_failure(&format!("Failed to load data: {}", err));
                return Err(err.into());
            }
        };

        let fingerprint = payload_fingerprint(&payload);
        let looks_unchanged =
            self.state.read().fingerprint.as_deref() == Some(fingerprint.as_str());
        if looks_unchanged {
            let outcome = self
                .state
                .write()
                .commit_unchanged(ticket, &fingerprint, Utc::now());
            match outcome {
                Some(RefreshOutcome::Unchanged) => {
                    log::debug!("Refresh #{}: payload unchanged", ticket);
                    // Relative periods move with the clock even when the data does not.
                    self.recompute();
                    return Ok(RefreshOutcome::Unchanged);
                }
                Some(outcome) => return Ok(outcome),
                None => log::debug!(
                    "Refresh #{}: stored data changed meanwhile, normalizing",
                    ticket
                ),
            }
        }

        let events = match normalize(&payload, &self.settings.excluded, self.settings.timezone()) {
            Ok(events) => Arc::new(events),
            Err(err) => {
                log::warn!("Refresh #{} got a malformed payload: {}", ticket, err);
                self.notify_failure(&format!("Failed to load data: {}", err));
                return Err(err.into());
            }
        };

        let outcome = self
            .state
            .write()
            .commit_events(ticket, events, fingerprint, Utc::now());
        match outcome {
            RefreshOutcome::Applied { event_count } => {
                log::info!("Refresh #{} applied {} events", ticket, event_count);
                self.recompute();
            }
            _ => log::debug!("Dropping refresh #{}; a newer one was applied", ticket),
        }
        Ok(outcome)
    }

    /// Refresh unless a fetch started through this method is still running.
    pub async fn try_refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let Ok(_guard) = self.fetch_guard.try_lock() else {
            log::debug!("Refresh already in flight, skipping tick");
            return Ok(RefreshOutcome::Skipped);
        };
        self.refresh().await
    }

    /// Queue a filter change. Changes arriving within the debounce delay of
    /// each other collapse into one recomputation with the last query.
    pub fn request_filter(&self, query: FilterQuery) {
        self.filter_tx.send_replace(query);
    }

    /// Set the filter and recompute the view immediately.
    pub fn apply_filter(&self, query: FilterQuery) -> Arc<DashboardView> {
        {
            let mut state = self.state.write();
            state.query = query;
        }
        self.recompute();
        self.view()
    }

    /// Compute a view for `query` over the current events without changing
    /// the stored filter or view.
    pub fn query_view(&self, query: &FilterQuery) -> DashboardView {
        let events = Arc::clone(&self.state.read().events);
        build_view(&events, query, &self.settings.view, self.now())
    }

    pub fn view(&self) -> Arc<DashboardView> {
        Arc::clone(&self.state.read().view)
    }

    pub fn filter(&self) -> FilterQuery {
        self.state.read().query.clone()
    }

    pub fn events(&self) -> Arc<Vec<Event>> {
        Arc::clone(&self.state.read().events)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_updated
    }

    pub fn view_generation(&self) -> u64 {
        self.state.read().view_generation
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.write().active_notifications(Utc::now())
    }

    pub fn dismiss_notification(&self, id: u64) -> bool {
        self.state.write().dismiss(id)
    }

    /// Start the auto-refresh poller and the filter debouncer.
    pub fn spawn(self: Arc<Self>) -> ControllerHandle {
        poller::spawn(self)
    }

    pub(crate) fn filter_updates(&self) -> watch::Receiver<FilterQuery> {
        self.filter_tx.subscribe()
    }

    /// Rebuild the view from the stored events and filter.
    ///
    /// The view is computed outside the lock and stored only if neither the
    /// events nor the filter changed meanwhile; the change that raced us runs
    /// its own recomputation.
    fn recompute(&self) {
        let (events, query) = {
            let state = self.state.read();
            (Arc::clone(&state.events), state.query.clone())
        };
        let view = build_view(&events, &query, &self.settings.view, self.now());

        let mut state = self.state.write();
        if !Arc::ptr_eq(&state.events, &events) || state.query != query {
            log::debug!("Discarding view computed from superseded state");
            return;
        }
        state.view = Arc::new(view);
        state.view_generation += 1;
    }

    fn notify_failure(&self, message: &str) {
        self.state.write().notify(
            NotificationLevel::Error,
            message,
            Some(self.settings.notification_ttl),
        );
    }
}
