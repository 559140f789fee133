//! Normalization of upstream payloads into a flat event list.

use std::collections::HashSet;

use chrono_tz::Tz;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::models::{Event, RawEvent};

/// Flatten a payload into events.
///
/// A JSON array is taken as is; an object grouping events per device is
/// flattened by concatenating its values in key order as received. Events
/// whose device is in `excluded` are dropped. Any other shape, or an element
/// that is not an event object, fails the whole call.
pub fn normalize(raw: &Value, excluded: &HashSet<String>, tz: Tz) -> CoreResult<Vec<Event>> {
    let raw_events = match raw {
        Value::Array(_) => decode_events(raw, "")?,
        Value::Object(groups) => {
            let mut all = Vec::new();
            for (group, items) in groups {
                all.extend(decode_events(items, group)?);
            }
            all
        }
        other => {
            return Err(CoreError::malformed(format!(
                "expected an array or an object, got {}",
                json_kind(other)
            )))
        }
    };

    let total = raw_events.len();
    let events: Vec<Event> = raw_events
        .into_iter()
        .filter(|e| !excluded.contains(&e.device_id))
        .map(|e| e.into_event(tz))
        .collect();

    if events.len() < total {
        log::debug!(
            "Dropped {} events from excluded devices",
            total - events.len()
        );
    }
    Ok(events)
}

fn decode_events(value: &Value, group: &str) -> CoreResult<Vec<RawEvent>> {
    if !value.is_array() {
        return Err(CoreError::malformed(format!(
            "group '{}' must be an array of events, got {}",
            group,
            json_kind(value)
        )));
    }
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let location = if group.is_empty() {
            path
        } else {
            format!("{}{}", group, path)
        };
        CoreError::malformed(format!("invalid event at {}: {}", location, err.inner()))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Brussels;
    use serde_json::json;

    fn excluded() -> HashSet<String> {
        ["Buttin", "Buttout"].iter().map(|s| s.to_string()).collect()
    }

    fn reading(device: &str, delta: i64) -> Value {
        json!({
            "apparaat": device,
            "timestamp": "2024-08-02T18:00:00",
            "binnen": 1,
            "buiten": 0,
            "delta": delta,
            "totaal": 1
        })
    }

    #[test]
    fn test_array_passes_through() {
        let raw = json!([reading("Henk", 1), reading("Kamerotski", 2), reading("Henk", 1)]);
        let events = normalize(&raw, &HashSet::new(), Brussels).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].device_id, "Kamerotski");
    }

    #[test]
    fn test_mapping_concatenates_in_order_and_drops_excluded() {
        let raw = json!({
            "A": [reading("A", 1)],
            "Buttin": [reading("Buttin", 2)],
            "B": [reading("B", 3), reading("B", 4)]
        });
        let events = normalize(&raw, &excluded(), Brussels).unwrap();
        let deltas: Vec<i64> = events.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![1, 3, 4]);
    }

    #[test]
    fn test_scalar_payload_is_malformed() {
        for raw in [json!(42), json!("events"), json!(null)] {
            let err = normalize(&raw, &excluded(), Brussels).unwrap_err();
            assert!(matches!(err, CoreError::MalformedPayload { .. }));
        }
    }

    #[test]
    fn test_non_object_element_names_path() {
        let raw = json!({ "Henk": [reading("Henk", 1), 17] });
        let err = normalize(&raw, &excluded(), Brussels).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Henk[1]"), "{}", msg);
    }

    #[test]
    fn test_bad_timestamp_type_keeps_payload() {
        let raw = json!([
            reading("Henk", 1),
            {"apparaat": "Kamerotski", "timestamp": 1722618000, "delta": 2},
            {"apparaat": "Kamerotski", "timestamp": {"at": "noon"}, "delta": 3}
        ]);
        let events = normalize(&raw, &excluded(), Brussels).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events[0].timestamp.is_some());
        assert!(events[1].timestamp.is_none());
        assert!(events[2].timestamp.is_none());

        let roles = crate::services::CounterRoles::new("Kamerotski", "Henk");
        assert_eq!(crate::services::stats(&events, &roles).active_device_count, 2);
    }

    #[test]
    fn test_group_that_is_not_an_array() {
        let raw = json!({ "Henk": { "apparaat": "Henk" } });
        assert!(normalize(&raw, &excluded(), Brussels).is_err());
    }

    #[test]
    fn test_empty_payloads() {
        assert!(normalize(&json!([]), &excluded(), Brussels).unwrap().is_empty());
        assert!(normalize(&json!({}), &excluded(), Brussels).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_pass_through() {
        let raw = json!([reading("Henk", 1), reading("Henk", 1)]);
        let events = normalize(&raw, &excluded(), Brussels).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], events[1]);
    }
}
