//! Data Transfer Objects for the HTTP API.
//!
//! View payloads are served as the service types themselves; this module
//! holds the request parameters and the small response envelopes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActiveHours, FestivalLabel, FilterQuery, PeriodSelector, TimeOfDay};

/// Dashboard selection as sent by the browser, in query strings or as a JSON
/// body. Values mirror the dashboard's select boxes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterParams {
    /// `all` or a device id.
    pub device: Option<String>,
    /// `all`, `<year>-full`, `<year>-friday`, `<year>-saturday`,
    /// `last-<n>m|h|d` or `custom`.
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// `all-hours`, `friday-hours`, `saturday-hours` or `custom-hours`.
    pub hours: Option<String>,
    pub hours_start: Option<String>,
    pub hours_end: Option<String>,
}

impl FilterParams {
    /// Convert to a [`FilterQuery`].
    ///
    /// Unknown period or hours keywords fall back to "no constraint";
    /// malformed dates or times are rejected.
    pub fn into_query(self) -> Result<FilterQuery, String> {
        let device = non_empty(self.device).filter(|d| !d.eq_ignore_ascii_case("all"));

        let period = match non_empty(self.period).as_deref() {
            None | Some("all") => PeriodSelector::All,
            Some("custom") => PeriodSelector::Custom {
                start_date: parse_date(self.start_date, "start_date")?,
                end_date: parse_date(self.end_date, "end_date")?,
                start_time: parse_time(self.start_time, "start_time")?,
                end_time: parse_time(self.end_time, "end_time")?,
            },
            Some(other) => parse_period(other).unwrap_or_else(|| {
                log::warn!("Unrecognised period '{}', showing all data", other);
                PeriodSelector::All
            }),
        };

        let hours = match non_empty(self.hours).as_deref() {
            None => None,
            Some("all-hours") => Some(ActiveHours::AllHours),
            Some("friday-hours") => Some(ActiveHours::Friday),
            Some("saturday-hours") => Some(ActiveHours::Saturday),
            Some("custom-hours") => Some(ActiveHours::Custom {
                start: parse_time(self.hours_start, "hours_start")?,
                end: parse_time(self.hours_end, "hours_end")?,
            }),
            Some(other) => {
                log::warn!("Unrecognised hours filter '{}', ignoring", other);
                None
            }
        };

        Ok(FilterQuery {
            device,
            period,
            hours,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>, String> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| format!("{} must be YYYY-MM-DD, got '{}'", field, v))
        })
        .transpose()
}

fn parse_time(value: Option<String>, field: &str) -> Result<Option<TimeOfDay>, String> {
    non_empty(value)
        .map(|v| v.parse::<TimeOfDay>().map_err(|e| format!("{}: {}", field, e)))
        .transpose()
}

/// `<year>-full|friday|saturday` or `last-<n>m|h|d`.
fn parse_period(value: &str) -> Option<PeriodSelector> {
    if let Some(rest) = value.strip_prefix("last-") {
        let unit = rest.chars().last()?;
        let amount: i64 = rest[..rest.len() - unit.len_utf8()].parse().ok()?;
        let minutes = match unit {
            'm' => amount,
            'h' => amount.checked_mul(60)?,
            'd' => amount.checked_mul(24 * 60)?,
            _ => return None,
        };
        return Some(PeriodSelector::Recent { minutes });
    }

    let (year, label) = value.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let label = match label {
        "full" => FestivalLabel::Full,
        "friday" => FestivalLabel::Friday,
        "saturday" => FestivalLabel::Saturday,
        _ => return None,
    };
    Some(PeriodSelector::festival(year, label))
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: String,
    pub event_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Response for a forced refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    #[serde(flatten)]
    pub outcome: crate::controller::RefreshOutcome,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Response for a filter change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    pub query: FilterQuery,
    /// `true` when the view will be recomputed after the debounce delay.
    pub pending: bool,
}
