#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use serde_json::{json, Value};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// One upstream reading in wire format, with an offset-less local timestamp.
pub fn reading(device: &str, timestamp: &str, binnen: u64, buiten: u64, delta: i64) -> Value {
    json!({
        "apparaat": device,
        "timestamp": timestamp,
        "binnen": binnen,
        "buiten": buiten,
        "delta": delta,
        "totaal": binnen as i64 - buiten as i64
    })
}

/// A device-grouped payload covering the 2024 Friday night, Saturday
/// afternoon and an excluded test counter.
pub fn festival_payload() -> Value {
    json!({
        "Kamerotski": [
            reading("Kamerotski", "2024-08-02T17:30:00", 2, 0, 2),
            reading("Kamerotski", "2024-08-02T19:00:00", 10, 0, 10),
            reading("Kamerotski", "2024-08-02T23:45:00", 30, 0, 20),
            reading("Kamerotski", "2024-08-03T14:00:00", 40, 0, 6)
        ],
        "Henk": [
            reading("Henk", "2024-08-02T22:10:00", 0, 3, 3),
            reading("Henk", "2024-08-03T01:30:00", 0, 9, 6),
            reading("Henk", "2024-08-03T03:00:00", 0, 12, 3)
        ],
        "Buttin": [
            reading("Buttin", "2024-08-02T20:00:00", 99, 0, 99)
        ]
    })
}
