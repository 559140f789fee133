//! Period selectors and the concrete ranges they resolve to.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::time::TimeOfDay;

/// Events whose local hour is below this value may belong to the previous
/// day's overnight window.
pub const OVERNIGHT_TAIL_END_HOUR: u32 = 6;

/// Which part of a festival edition is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FestivalLabel {
    Full,
    Friday,
    Saturday,
}

impl FestivalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FestivalLabel::Full => "full",
            FestivalLabel::Friday => "friday",
            FestivalLabel::Saturday => "saturday",
        }
    }
}

/// A declarative period selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodSelector {
    /// No date constraint.
    #[default]
    All,
    /// One festival edition from the calendar.
    Festival { year: i32, label: FestivalLabel },
    /// The trailing window ending at "now".
    Recent { minutes: i64 },
    /// User-entered bounds. Both dates are required for a constraint.
    Custom {
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        start_time: Option<TimeOfDay>,
        end_time: Option<TimeOfDay>,
    },
}

impl PeriodSelector {
    pub fn festival(year: i32, label: FestivalLabel) -> Self {
        PeriodSelector::Festival { year, label }
    }

    pub fn recent(duration: Duration) -> Self {
        PeriodSelector::Recent {
            minutes: duration.num_minutes(),
        }
    }
}

/// A time-of-day window, possibly wrapping past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub overnight: bool,
}

impl TimeOfDayWindow {
    /// Build a window; it is overnight exactly when `start > end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            start,
            end,
            overnight: start > end,
        }
    }

    /// Window for a user-entered pair. Missing bounds or the default
    /// `00:00`–`23:59` pair mean "whole day", i.e. no window.
    pub fn custom(start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end))
                if !(start == TimeOfDay::MIDNIGHT && end == TimeOfDay::END_OF_DAY) =>
            {
                Some(Self::new(start, end))
            }
            _ => None,
        }
    }

    /// Membership test: `[start, end)` for a regular window,
    /// `>= start || < end` for an overnight one.
    pub fn contains(&self, time: TimeOfDay) -> bool {
        if self.overnight {
            time >= self.start || time < self.end
        } else {
            time >= self.start && time < self.end
        }
    }
}

/// The concrete range a selector resolves to.
///
/// `start` and `end` are inclusive instants in the configured timezone.
/// A whole-day range matches on local calendar dates instead of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub window: Option<TimeOfDayWindow>,
    #[serde(default)]
    pub whole_days: bool,
}

impl ResolvedRange {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            start,
            end,
            window: None,
            whole_days: false,
        }
    }

    /// Range over the calendar dates of `start` through `end`, inclusive.
    pub fn whole_days(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            whole_days: true,
            ..Self::new(start, end)
        }
    }

    /// A range spanning every representable instant, used when only a
    /// time-of-day window constrains the selection.
    pub fn unbounded() -> Self {
        Self::new(
            DateTime::<Utc>::MIN_UTC.fixed_offset(),
            DateTime::<Utc>::MAX_UTC.fixed_offset(),
        )
    }

    pub fn with_window(mut self, window: Option<TimeOfDayWindow>) -> Self {
        self.window = window;
        self
    }

    /// Whether a local calendar date lies within the range's dates.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        date >= self.start.date_naive() && date <= self.end.date_naive()
    }

    /// Date-stage membership.
    ///
    /// With a time-of-day window, an early-morning event also belongs to the
    /// range when the previous day does, so the tail of an overnight window
    /// stays attributed to the day it started on.
    pub fn admits(&self, timestamp: &DateTime<FixedOffset>) -> bool {
        let inside = if self.whole_days {
            self.covers_date(timestamp.date_naive())
        } else {
            *timestamp >= self.start && *timestamp <= self.end
        };
        if inside {
            return true;
        }
        if self.window.is_none() || timestamp.hour() >= OVERNIGHT_TAIL_END_HOUR {
            return false;
        }
        timestamp
            .date_naive()
            .pred_opt()
            .map(|previous| self.covers_date(previous))
            .unwrap_or(false)
    }
}

/// Explicit active-hours choice that overrides a range's own window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveHours {
    /// Drop any time-of-day restriction.
    AllHours,
    /// Canonical Friday festival hours.
    Friday,
    /// Canonical Saturday festival hours.
    Saturday,
    Custom {
        start: Option<TimeOfDay>,
        end: Option<TimeOfDay>,
    },
}

/// A complete dashboard selection: device, period and optional hours override.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterQuery {
    pub device: Option<String>,
    #[serde(default)]
    pub period: PeriodSelector,
    #[serde(default)]
    pub hours: Option<ActiveHours>,
}

impl FilterQuery {
    pub fn for_period(period: PeriodSelector) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_hours(mut self, hours: ActiveHours) -> Self {
        self.hours = Some(hours);
        self
    }
}
