//! Wall-clock helpers: time-of-day values and timestamp parsing in the
//! configured timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Offset-less layouts accepted for upstream timestamps, tried in order.
const LOCAL_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A minute-resolution time of day (`HH:MM`).
///
/// Ordering matches the decimal-hour ordering `hour + minute / 60`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };
    /// Last minute of the day, the upper bound of a "whole day" selection.
    pub const END_OF_DAY: TimeOfDay = TimeOfDay { minutes: 23 * 60 + 59 };

    /// Create a time of day, returning `None` for out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: (hour * 60 + minute) as u16,
            })
        } else {
            None
        }
    }

    /// Time of day of any chrono value carrying a clock time.
    pub fn of<T: Timelike>(value: &T) -> Self {
        Self {
            minutes: (value.hour() * 60 + value.minute()) as u16,
        }
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.minutes) / 60
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minutes) % 60
    }

    /// Minutes elapsed since midnight (0..1440).
    pub fn minute_of_day(&self) -> u32 {
        u32::from(self.minutes)
    }

    /// The same instant as decimal hours, e.g. `18:30` → `18.5`.
    pub fn decimal_hours(&self) -> f64 {
        f64::from(self.minutes) / 60.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    /// Parse `HH:MM` (a trailing `:SS` is accepted and ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let hour = parts
            .next()
            .and_then(|h| h.trim().parse::<u32>().ok())
            .ok_or_else(|| format!("Invalid time of day '{}': expected HH:MM", s))?;
        let minute = parts
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .ok_or_else(|| format!("Invalid time of day '{}': expected HH:MM", s))?;
        if let Some(seconds) = parts.next() {
            seconds
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid time of day '{}': bad seconds", s))?;
        }
        if parts.next().is_some() {
            return Err(format!("Invalid time of day '{}': expected HH:MM", s));
        }
        TimeOfDay::new(hour, minute).ok_or_else(|| format!("Time of day '{}' out of range", s))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an upstream timestamp into the configured timezone.
///
/// Timestamps carrying an offset (`Z`, `+02:00`) are converted; offset-less
/// ones are read as wall-clock time in `tz`. A wall-clock time that falls in
/// a DST gap is shifted forward by one hour. Returns `None` when the string
/// cannot be parsed at all.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.with_timezone(&tz).fixed_offset());
    }

    let naive = LOCAL_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())?;
    localize(naive, tz)
}

/// Attach `tz` to a wall-clock time, resolving folds to the earlier instant.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.fixed_offset())
}

/// Clamp a minute count into a bucket width in `1..=1440`.
pub(crate) fn bucket_width(interval_minutes: u32) -> u32 {
    interval_minutes.clamp(1, MINUTES_PER_DAY)
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
