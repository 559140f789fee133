//! Event filtering: device, then date range, then time of day.
//!
//! Each stage borrows its input and returns a new vector. [`matches`] is the
//! composed membership predicate; [`filter`] is equivalent to keeping the
//! events for which it holds and sorting them newest first.

use crate::models::{Event, ResolvedRange, TimeOfDayWindow};

use super::ordering::sort_descending_by_timestamp;

/// Whether `event` belongs to the selection.
pub fn matches(event: &Event, device: Option<&str>, range: Option<&ResolvedRange>) -> bool {
    if !matches_device(event, device) {
        return false;
    }
    match range {
        None => true,
        Some(range) => matches_range(event, range) && matches_window(event, range.window.as_ref()),
    }
}

pub fn matches_device(event: &Event, device: Option<&str>) -> bool {
    device.map_or(true, |id| event.device_id == id)
}

/// Date-stage membership. Unparseable timestamps are never in range.
pub fn matches_range(event: &Event, range: &ResolvedRange) -> bool {
    event
        .timestamp
        .as_ref()
        .map_or(false, |ts| range.admits(ts))
}

pub fn matches_window(event: &Event, window: Option<&TimeOfDayWindow>) -> bool {
    match window {
        None => true,
        Some(window) => event
            .time_of_day()
            .map_or(false, |time| window.contains(time)),
    }
}

pub fn by_device(events: &[Event], device: Option<&str>) -> Vec<Event> {
    events
        .iter()
        .filter(|e| matches_device(e, device))
        .cloned()
        .collect()
}

pub fn by_range(events: &[Event], range: &ResolvedRange) -> Vec<Event> {
    events
        .iter()
        .filter(|e| matches_range(e, range))
        .cloned()
        .collect()
}

pub fn by_time_of_day(events: &[Event], window: &TimeOfDayWindow) -> Vec<Event> {
    events
        .iter()
        .filter(|e| matches_window(e, Some(window)))
        .cloned()
        .collect()
}

/// Apply all stages and return the result sorted newest first.
///
/// With neither a device nor a range this is the input reordered.
pub fn filter(events: &[Event], device: Option<&str>, range: Option<&ResolvedRange>) -> Vec<Event> {
    let mut selected = by_device(events, device);
    if let Some(range) = range {
        selected = by_range(&selected, range);
        if let Some(window) = range.window.as_ref() {
            selected = by_time_of_day(&selected, window);
        }
    }
    log::debug!(
        "Filter kept {} of {} events (device: {:?}, ranged: {})",
        selected.len(),
        events.len(),
        device,
        range.is_some()
    );
    sort_descending_by_timestamp(&mut selected);
    selected
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;
