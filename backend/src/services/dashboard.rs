//! Composition of a complete dashboard view from a snapshot and a query.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::error::ConfigError;
use crate::models::{Event, FilterQuery, ResolvedRange};

use super::aggregator::{self, CounterRoles, DeltaPoint, Stats, TimelinePoint};
use super::filter::filter;
use super::ordering::take_top;
use super::range_resolver::RangeResolver;

/// Everything view composition needs besides the events and the query.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub resolver: RangeResolver,
    pub roles: CounterRoles,
    pub bucket_minutes: u32,
    pub timeline_points: usize,
    pub table_rows: usize,
    pub delta_points: usize,
}

impl ViewSettings {
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            resolver: RangeResolver::new(config.festival.clone(), config.timezone()?),
            roles: config.counter_roles(),
            bucket_minutes: config.display.bucket_minutes,
            timeline_points: config.display.timeline_points,
            table_rows: config.display.table_rows,
            delta_points: config.display.delta_points,
        })
    }
}

/// A rendered selection: the data behind every dashboard panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub generated_at: DateTime<FixedOffset>,
    pub query: FilterQuery,
    pub range: Option<ResolvedRange>,
    /// Number of events that passed the filter.
    pub event_count: usize,
    pub stats: Stats,
    /// Newest events first, limited to the table size.
    pub activity: Vec<Event>,
    pub timeline: Vec<TimelinePoint>,
    pub latest_by_device: Vec<Event>,
    pub recent_deltas: Vec<DeltaPoint>,
}

impl DashboardView {
    /// View of an empty snapshot.
    pub fn empty(query: FilterQuery, now: DateTime<FixedOffset>) -> Self {
        Self {
            generated_at: now,
            query,
            range: None,
            event_count: 0,
            stats: Stats::default(),
            activity: Vec::new(),
            timeline: Vec::new(),
            latest_by_device: Vec::new(),
            recent_deltas: Vec::new(),
        }
    }
}

/// Resolve, filter and aggregate `events` for `query` as of `now`.
pub fn build_view(
    events: &[Event],
    query: &FilterQuery,
    settings: &ViewSettings,
    now: DateTime<FixedOffset>,
) -> DashboardView {
    let range = settings
        .resolver
        .resolve_with_hours(&query.period, query.hours.as_ref(), now);
    let filtered = filter(events, query.device.as_deref(), range.as_ref());

    DashboardView {
        generated_at: now,
        query: query.clone(),
        range,
        event_count: filtered.len(),
        stats: aggregator::stats(&filtered, &settings.roles),
        activity: take_top(&filtered, settings.table_rows).to_vec(),
        timeline: aggregator::timeline(&filtered, settings.bucket_minutes, settings.timeline_points),
        latest_by_device: aggregator::latest_by_device(&filtered),
        recent_deltas: aggregator::recent_deltas(&filtered, settings.delta_points),
    }
}
