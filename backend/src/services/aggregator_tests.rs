use super::*;
use chrono::TimeZone;
use chrono_tz::Europe::Brussels;

fn at(d: u32, h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    Brussels
        .with_ymd_and_hms(2024, 8, d, h, m, s)
        .unwrap()
        .fixed_offset()
}

fn event(device: &str, ts: Option<DateTime<FixedOffset>>, delta: i64) -> Event {
    Event {
        device_id: device.to_string(),
        timestamp: ts,
        in_count: 0,
        out_count: 0,
        delta,
        total: 0,
    }
}

fn counts(device: &str, ts: DateTime<FixedOffset>, in_count: u64, out_count: u64) -> Event {
    Event {
        in_count,
        out_count,
        ..event(device, Some(ts), 0)
    }
}

fn roles() -> CounterRoles {
    CounterRoles::new("Kamerotski", "Henk")
}

#[test]
fn test_stats_concrete_case() {
    let events = vec![
        event("Kamerotski", Some(at(2, 18, 0, 0)), 10),
        event("Henk", Some(at(2, 18, 5, 0)), 4),
    ];
    let stats = stats(&events, &roles());
    assert_eq!(
        stats,
        Stats {
            total_inside: 10,
            total_outside: 4,
            net_movement: 6,
            active_device_count: 2,
        }
    );
}

#[test]
fn test_stats_counts_other_devices_as_active_only() {
    let events = vec![
        event("Kamerotski", Some(at(2, 18, 0, 0)), 10),
        event("Henk", Some(at(2, 18, 5, 0)), 4),
        event("Bar", None, 100),
    ];
    let stats = stats(&events, &roles());
    assert_eq!(stats.total_inside, 10);
    assert_eq!(stats.total_outside, 4);
    assert_eq!(stats.active_device_count, 3);
}

#[test]
fn test_stats_sum_mode() {
    let mut roles = roles();
    roles.net_movement = NetMovementMode::Sum;
    let events = vec![
        event("Kamerotski", Some(at(2, 18, 0, 0)), 10),
        event("Henk", Some(at(2, 18, 5, 0)), 4),
    ];
    assert_eq!(stats(&events, &roles).net_movement, 14);
}

#[test]
fn test_stats_counting_since_cutoff() {
    let mut roles = roles();
    roles.counting_since = Some(at(2, 18, 0, 0));
    let events = vec![
        event("Kamerotski", Some(at(2, 18, 0, 0)), 10),
        event("Kamerotski", Some(at(2, 18, 1, 0)), 3),
        event("Henk", None, 4),
    ];
    let stats = stats(&events, &roles);
    assert_eq!(stats.total_inside, 3);
    assert_eq!(stats.total_outside, 0);
    assert_eq!(stats.active_device_count, 2);
}

#[test]
fn test_stats_is_idempotent() {
    let events = vec![
        event("Kamerotski", Some(at(2, 18, 0, 0)), 7),
        event("Henk", Some(at(2, 19, 0, 0)), -2),
    ];
    let roles = roles();
    assert_eq!(stats(&events, &roles), stats(&events, &roles));
}

#[test]
fn test_stats_empty() {
    assert_eq!(stats(&[], &roles()), Stats::default());
}

#[test]
fn test_latest_by_device_first_appearance_order() {
    let events = vec![
        event("Henk", Some(at(2, 10, 0, 0)), 1),
        event("Kamerotski", Some(at(2, 12, 0, 0)), 2),
        event("Henk", Some(at(2, 11, 0, 0)), 3),
        event("Henk", Some(at(2, 9, 0, 0)), 4),
    ];
    let latest = latest_by_device(&events);
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].device_id, "Henk");
    assert_eq!(latest[0].delta, 3);
    assert_eq!(latest[1].device_id, "Kamerotski");
}

#[test]
fn test_latest_by_device_ties_last_wins() {
    let events = vec![
        event("Henk", Some(at(2, 10, 0, 0)), 1),
        event("Henk", Some(at(2, 10, 0, 0)), 2),
    ];
    assert_eq!(latest_by_device(&events)[0].delta, 2);
}

#[test]
fn test_latest_by_device_prefers_parsed_timestamps() {
    let events = vec![
        event("Henk", Some(at(2, 10, 0, 0)), 1),
        event("Henk", None, 2),
    ];
    assert_eq!(latest_by_device(&events)[0].delta, 1);
}

#[test]
fn test_rounded_mean_half_up() {
    assert_eq!(rounded_mean(5, 2), 3);
    assert_eq!(rounded_mean(4, 2), 2);
    assert_eq!(rounded_mean(7, 3), 2);
    assert_eq!(rounded_mean(0, 0), 0);
    assert_eq!(rounded_mean(1, 4), 0);
}

#[test]
fn test_rounded_mean_wide_sums() {
    let max = u128::from(u64::MAX);
    assert_eq!(rounded_mean(max, 1), u64::MAX);
    assert_eq!(rounded_mean(max * 3, 3), u64::MAX);
    assert_eq!(rounded_mean(max, u64::MAX), 1);
    assert_eq!(rounded_mean(u128::from(u64::MAX / 2), u64::MAX), 0);
}

#[test]
fn test_timeline_large_counts() {
    let big = u64::MAX / 2 + 1;
    let events = vec![
        counts("Henk", at(2, 18, 0, 0), big, u64::MAX),
        counts("Henk", at(2, 18, 1, 0), big, u64::MAX),
    ];
    let points = timeline(&events, 5, 10);
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].inside, big);
    assert_eq!(points[0].outside, u64::MAX);
}

#[test]
fn test_stats_totals_saturate() {
    let events = vec![
        event("Kamerotski", Some(at(2, 18, 0, 0)), i64::MAX),
        event("Kamerotski", Some(at(2, 18, 1, 0)), 5),
        event("Henk", Some(at(2, 18, 2, 0)), i64::MIN),
    ];
    let stats = stats(&events, &roles());
    assert_eq!(stats.total_inside, i64::MAX);
    assert_eq!(stats.total_outside, i64::MIN);
    assert_eq!(stats.net_movement, i64::MAX);
    assert_eq!(NetMovementMode::Sum.combine(i64::MAX, 1), i64::MAX);
}

#[test]
fn test_timeline_buckets_and_rounds() {
    let events = vec![
        counts("Kamerotski", at(2, 18, 7, 0), 3, 1),
        counts("Henk", at(2, 18, 3, 0), 2, 0),
        counts("Kamerotski", at(2, 18, 9, 59), 1, 1),
        counts("Henk", at(2, 18, 5, 0), 4, 2),
    ];
    let points = timeline(&events, 5, 288);
    assert_eq!(points.len(), 2);

    assert_eq!(points[0].bucket_start, at(2, 18, 0, 0));
    assert_eq!(points[0].samples, 1);
    assert_eq!(points[0].inside, 2);

    assert_eq!(points[1].bucket_start, at(2, 18, 5, 0));
    assert_eq!(points[1].samples, 3);
    // (4 + 3 + 1) / 3 = 2.67 and (2 + 1 + 1) / 3 = 1.33
    assert_eq!(points[1].inside, 3);
    assert_eq!(points[1].outside, 1);
    assert_eq!(points[1].label, "Fri 18:05");
}

#[test]
fn test_timeline_tie_rounds_up() {
    let events = vec![
        counts("Henk", at(2, 18, 0, 0), 2, 0),
        counts("Henk", at(2, 18, 1, 0), 3, 0),
    ];
    let points = timeline(&events, 5, 288);
    assert_eq!(points[0].inside, 3);
}

#[test]
fn test_timeline_keeps_newest_points_in_ascending_order() {
    let events: Vec<Event> = (0..10)
        .map(|i| counts("Henk", at(2, 12, 0, 0) + chrono::Duration::minutes(i * 5), i as u64, 0))
        .collect();
    let points = timeline(&events, 5, 3);
    assert_eq!(points.len(), 3);
    let inside: Vec<u64> = points.iter().map(|p| p.inside).collect();
    assert_eq!(inside, vec![7, 8, 9]);
}

#[test]
fn test_timeline_separates_days() {
    let events = vec![
        counts("Henk", at(2, 18, 0, 0), 1, 0),
        counts("Henk", at(3, 18, 0, 0), 5, 0),
    ];
    let points = timeline(&events, 60, 288);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].label, "Fri 18:00");
    assert_eq!(points[1].label, "Sat 18:00");
}

#[test]
fn test_timeline_skips_unparseable() {
    let events = vec![event("Henk", None, 1)];
    assert!(timeline(&events, 5, 288).is_empty());
}

#[test]
fn test_recent_deltas_takes_first_n() {
    let events = vec![
        event("Henk", Some(at(2, 18, 0, 42)), -3),
        event("Kamerotski", Some(at(2, 17, 59, 0)), 5),
        event("Henk", None, 1),
    ];
    let deltas = recent_deltas(&events, 2);
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0].delta, -3);
    assert_eq!(deltas[0].label, "18:00:42");
    assert_eq!(deltas[1].device_id, "Kamerotski");
    assert_eq!(recent_deltas(&events, 20)[2].label, "");
}
