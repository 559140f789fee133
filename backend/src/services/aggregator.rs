//! Derived aggregates over a filtered event list.
//!
//! All functions are pure and leave their input untouched; calling any of
//! them twice on the same events yields the same result.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::time::bucket_width;
use crate::models::Event;

/// Label layout for timeline points, e.g. `Fri 18:05`.
pub const TIMELINE_LABEL_FORMAT: &str = "%a %H:%M";
/// Label layout for delta points, e.g. `18:05:42`.
pub const DELTA_LABEL_FORMAT: &str = "%H:%M:%S";

/// How the inside and outside totals combine into net movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetMovementMode {
    /// `inside - outside`: current occupancy.
    #[default]
    Difference,
    /// `inside + outside`: total traffic through both counters.
    Sum,
}

impl NetMovementMode {
    pub fn combine(&self, inside: i64, outside: i64) -> i64 {
        match self {
            NetMovementMode::Difference => inside.saturating_sub(outside),
            NetMovementMode::Sum => inside.saturating_add(outside),
        }
    }
}

/// Which devices count people in and out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRoles {
    pub inside: String,
    pub outside: String,
    pub net_movement: NetMovementMode,
    /// When set, only events strictly after this instant feed the totals.
    pub counting_since: Option<DateTime<FixedOffset>>,
}

impl CounterRoles {
    pub fn new(inside: impl Into<String>, outside: impl Into<String>) -> Self {
        Self {
            inside: inside.into(),
            outside: outside.into(),
            net_movement: NetMovementMode::default(),
            counting_since: None,
        }
    }

    fn counts(&self, event: &Event) -> bool {
        match self.counting_since {
            None => true,
            Some(since) => event.timestamp.map_or(false, |ts| ts > since),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_inside: i64,
    pub total_outside: i64,
    pub net_movement: i64,
    pub active_device_count: usize,
}

/// Directional totals from the role devices' deltas plus the number of
/// distinct devices present.
pub fn stats(events: &[Event], roles: &CounterRoles) -> Stats {
    let mut total_inside = 0i64;
    let mut total_outside = 0i64;
    let mut devices: HashSet<&str> = HashSet::new();

    for event in events {
        devices.insert(event.device_id.as_str());
        if !roles.counts(event) {
            continue;
        }
        if event.device_id == roles.inside {
            total_inside = total_inside.saturating_add(event.delta);
        } else if event.device_id == roles.outside {
            total_outside = total_outside.saturating_add(event.delta);
        }
    }

    Stats {
        total_inside,
        total_outside,
        net_movement: roles.net_movement.combine(total_inside, total_outside),
        active_device_count: devices.len(),
    }
}

/// Most recent event per device, in order of each device's first appearance.
///
/// When two events share the maximal timestamp the later one in the input
/// wins. A device whose events all lack a timestamp keeps its last event.
pub fn latest_by_device(events: &[Event]) -> Vec<Event> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &Event> = HashMap::new();

    for event in events {
        let id = event.device_id.as_str();
        match latest.get(id) {
            None => {
                order.push(id);
                latest.insert(id, event);
            }
            Some(current) if event.timestamp >= current.timestamp => {
                latest.insert(id, event);
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|id| latest.get(id).map(|e| (*e).clone()))
        .collect()
}

/// One bucket of the occupancy timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Start of the bucket in the configured timezone.
    pub bucket_start: DateTime<FixedOffset>,
    pub label: String,
    /// Rounded mean of `in_count` over the bucket.
    pub inside: u64,
    /// Rounded mean of `out_count` over the bucket.
    pub outside: u64,
    pub samples: u64,
}

#[derive(Debug, Default)]
struct TimeBucket {
    start: Option<DateTime<FixedOffset>>,
    sum_in: u128,
    sum_out: u128,
    count: u64,
}

impl TimeBucket {
    fn add(&mut self, start: DateTime<FixedOffset>, event: &Event) {
        self.start.get_or_insert(start);
        self.sum_in += u128::from(event.in_count);
        self.sum_out += u128::from(event.out_count);
        self.count += 1;
    }
}

/// Mean rounded half-up, `0` for an empty bucket.
///
/// `sum` is wide so a bucket of `u64` counters never overflows.
pub fn rounded_mean(sum: u128, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    let count = u128::from(count);
    let (quotient, remainder) = (sum / count, sum % count);
    let mean = quotient + u128::from(remainder >= count - remainder);
    u64::try_from(mean).unwrap_or(u64::MAX)
}

/// Fixed-interval occupancy series, oldest first, limited to the newest
/// `max_points` buckets. Events without a timestamp are skipped.
pub fn timeline(events: &[Event], interval_minutes: u32, max_points: usize) -> Vec<TimelinePoint> {
    let width = bucket_width(interval_minutes);
    let mut buckets: BTreeMap<(NaiveDate, u32, u32), TimeBucket> = BTreeMap::new();

    let mut dated: Vec<(&DateTime<FixedOffset>, &Event)> = events
        .iter()
        .filter_map(|e| e.timestamp.as_ref().map(|ts| (ts, e)))
        .collect();
    dated.sort_by(|a, b| a.0.cmp(b.0));

    for (ts, event) in dated {
        let floored = ts.minute() / width * width;
        let key = (ts.date_naive(), ts.hour(), floored);
        let start = ts
            .with_minute(floored)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(*ts);
        buckets.entry(key).or_default().add(start, event);
    }

    let skip = buckets.len().saturating_sub(max_points);
    buckets
        .into_values()
        .skip(skip)
        .filter_map(|bucket| {
            let start = bucket.start?;
            Some(TimelinePoint {
                bucket_start: start,
                label: start.format(TIMELINE_LABEL_FORMAT).to_string(),
                inside: rounded_mean(bucket.sum_in, bucket.count),
                outside: rounded_mean(bucket.sum_out, bucket.count),
                samples: bucket.count,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPoint {
    pub device_id: String,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub label: String,
    pub delta: i64,
}

/// Deltas of the first `n` events, in the order given (newest first when fed
/// the filter output).
pub fn recent_deltas(events: &[Event], n: usize) -> Vec<DeltaPoint> {
    events
        .iter()
        .take(n)
        .map(|event| DeltaPoint {
            device_id: event.device_id.clone(),
            timestamp: event.timestamp,
            label: event
                .timestamp
                .map(|ts| ts.format(DELTA_LABEL_FORMAT).to_string())
                .unwrap_or_default(),
            delta: event.delta,
        })
        .collect()
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod aggregator_tests;
