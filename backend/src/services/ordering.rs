//! Ordering and slicing of event lists.

use std::cmp::Ordering;

use crate::models::Event;

/// Newest first, comparing instants. Events without a timestamp go last.
fn newest_first(a: &Event, b: &Event) -> Ordering {
    match (&a.timestamp, &b.timestamp) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable descending sort by timestamp; equal timestamps keep input order.
pub fn sort_descending_by_timestamp(events: &mut [Event]) {
    events.sort_by(newest_first);
}

/// The first `n` events, or all of them when there are fewer.
pub fn take_top(events: &[Event], n: usize) -> &[Event] {
    &events[..n.min(events.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn event(device: &str, ts: Option<(u32, u32)>, delta: i64) -> Event {
        Event {
            device_id: device.to_string(),
            timestamp: ts.map(|(h, m)| {
                FixedOffset::east_opt(7200)
                    .unwrap()
                    .with_ymd_and_hms(2024, 8, 2, h, m, 0)
                    .unwrap()
            }),
            in_count: 0,
            out_count: 0,
            delta,
            total: 0,
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut events = vec![
            event("a", Some((10, 0)), 1),
            event("a", Some((12, 0)), 2),
            event("a", Some((11, 0)), 3),
        ];
        sort_descending_by_timestamp(&mut events);
        let deltas: Vec<i64> = events.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_is_stable_and_puts_unparseable_last() {
        let mut events = vec![
            event("a", None, 1),
            event("a", Some((10, 0)), 2),
            event("b", Some((10, 0)), 3),
            event("b", None, 4),
        ];
        sort_descending_by_timestamp(&mut events);
        let deltas: Vec<i64> = events.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_sort_compares_instants_across_offsets() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let mut events = vec![event("a", Some((11, 0)), 1), event("a", None, 2)];
        // 09:30 UTC is 11:30 at +02:00, so it is newer.
        events[1].timestamp = Some(utc.with_ymd_and_hms(2024, 8, 2, 9, 30, 0).unwrap());
        sort_descending_by_timestamp(&mut events);
        assert_eq!(events[0].delta, 2);
    }

    #[test]
    fn test_take_top() {
        let events = vec![event("a", None, 1), event("a", None, 2), event("a", None, 3)];
        assert_eq!(take_top(&events, 2).len(), 2);
        assert_eq!(take_top(&events, 10).len(), 3);
        assert!(take_top(&events, 0).is_empty());
        assert!(take_top(&[], 5).is_empty());
    }
}
