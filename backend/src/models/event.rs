//! Counter events as delivered by the upstream counting API.

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};

use super::time::{parse_timestamp, TimeOfDay};

/// Wire representation of one counter reading.
///
/// Field names follow the upstream API. Missing counters default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "apparaat")]
    pub device_id: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: String,
    #[serde(rename = "binnen", default, deserialize_with = "null_as_default")]
    pub in_count: u64,
    #[serde(rename = "buiten", default, deserialize_with = "null_as_default")]
    pub out_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delta: i64,
    #[serde(rename = "totaal", default, deserialize_with = "null_as_default")]
    pub total: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any JSON value for the timestamp. Non-string values keep their
/// JSON text and end up unparseable instead of failing the payload.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

impl RawEvent {
    /// Resolve the wire timestamp into `tz`, keeping unparseable ones as `None`.
    pub fn into_event(self, tz: Tz) -> Event {
        let timestamp = parse_timestamp(&self.timestamp, tz);
        if timestamp.is_none() {
            log::debug!(
                "Unparseable timestamp '{}' for device {}",
                self.timestamp,
                self.device_id
            );
        }
        Event {
            device_id: self.device_id,
            timestamp,
            in_count: self.in_count,
            out_count: self.out_count,
            delta: self.delta,
            total: self.total,
        }
    }
}

/// A normalized counter event.
///
/// The timestamp is expressed in the configured timezone, so its date and
/// clock fields are local. `None` marks a timestamp that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub device_id: String,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub in_count: u64,
    pub out_count: u64,
    pub delta: i64,
    pub total: i64,
}

impl Event {
    /// Local calendar date.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date_naive())
    }

    /// Local time of day.
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        self.timestamp.as_ref().map(TimeOfDay::of)
    }
}
