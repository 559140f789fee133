//! Controller-owned dashboard state and user-visible notifications.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::RefreshOutcome;
use crate::models::{Event, FilterQuery};
use crate::services::DashboardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A non-fatal message for the dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// `None` for notifications that stay until cleared.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| now < expires)
    }
}

/// Everything the dashboard shows, replaced wholesale on each update.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Normalized events of the last applied fetch.
    pub events: Arc<Vec<Event>>,
    /// Fingerprint of the payload `events` came from.
    pub fingerprint: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Ticket of the newest refresh applied so far.
    pub applied_seq: u64,
    pub query: FilterQuery,
    pub view: Arc<DashboardView>,
    /// Bumped every time a new view is stored.
    pub view_generation: u64,
    notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl DashboardState {
    pub fn new(query: FilterQuery, view: DashboardView) -> Self {
        Self {
            events: Arc::new(Vec::new()),
            fingerprint: None,
            last_updated: None,
            applied_seq: 0,
            query,
            view: Arc::new(view),
            view_generation: 0,
            notifications: Vec::new(),
            next_notification_id: 1,
        }
    }

    /// Record refresh `ticket` whose payload has `fingerprint`, without new
    /// events.
    ///
    /// Returns `None` when the stored data came from a different payload, in
    /// which case the caller has to normalize and go through
    /// [`commit_events`](Self::commit_events).
    pub fn commit_unchanged(
        &mut self,
        ticket: u64,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> Option<RefreshOutcome> {
        if ticket <= self.applied_seq {
            return Some(RefreshOutcome::Stale);
        }
        if self.fingerprint.as_deref() != Some(fingerprint) {
            return None;
        }
        self.applied_seq = ticket;
        self.last_updated = Some(now);
        Some(RefreshOutcome::Unchanged)
    }

    /// Store the events of refresh `ticket` unless a newer one was applied.
    pub fn commit_events(
        &mut self,
        ticket: u64,
        events: Arc<Vec<Event>>,
        fingerprint: String,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        if ticket <= self.applied_seq {
            return RefreshOutcome::Stale;
        }
        let event_count = events.len();
        self.applied_seq = ticket;
        self.events = events;
        self.fingerprint = Some(fingerprint);
        self.last_updated = Some(now);
        RefreshOutcome::Applied { event_count }
    }

    /// Add a notification that disappears after `ttl`, or stays when `ttl`
    /// is `None`. Returns its id.
    pub fn notify(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
        ttl: Option<std::time::Duration>,
    ) -> u64 {
        let now = Utc::now();
        self.notifications.retain(|n| n.is_active(now));
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        let expires_at = ttl
            .and_then(|ttl| Duration::from_std(ttl).ok())
            .and_then(|ttl| now.checked_add_signed(ttl));
        self.notifications.push(Notification {
            id,
            level,
            message: message.into(),
            created_at: now,
            expires_at,
        });
        id
    }

    /// Drop expired notifications and return the remaining ones, oldest first.
    pub fn active_notifications(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        self.notifications.retain(|n| n.is_active(now));
        self.notifications.clone()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }
}
