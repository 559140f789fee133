//! # People Counter Backend
//!
//! Occupancy dashboard backend for door people-counters.
//!
//! The crate polls a people-counting API, filters the readings by device,
//! calendar range and time of day (including festival hours that run past
//! midnight) and serves totals, time-bucketed series and recent activity as
//! JSON.
//!
//! ## Architecture
//!
//! - [`models`]: events, period selectors, resolved ranges and time-of-day values
//! - [`services`]: the pure filtering core (resolve, filter, sort, aggregate)
//! - [`config`]: TOML configuration, including the festival calendar
//! - [`source`]: where raw payloads come from
//! - [`controller`]: dashboard state, refresh and debouncing
//! - [`http`]: Axum-based JSON API
//!
//! ## Example
//!
//! ```
//! use people_counter::config::DashboardConfig;
//! use people_counter::models::{FestivalLabel, FilterQuery, PeriodSelector};
//! use people_counter::services::{build_view, normalize, ViewSettings};
//!
//! let config = DashboardConfig::default();
//! let settings = ViewSettings::from_config(&config).unwrap();
//! let payload = serde_json::json!({
//!     "Kamerotski": [{"apparaat": "Kamerotski", "timestamp": "2024-08-02T19:00:00", "delta": 10}],
//!     "Henk": [{"apparaat": "Henk", "timestamp": "2024-08-03T01:30:00", "delta": 4}]
//! });
//! let events = normalize(&payload, &config.excluded_devices(), config.timezone().unwrap()).unwrap();
//!
//! let query = FilterQuery::for_period(PeriodSelector::festival(2024, FestivalLabel::Friday));
//! let now = chrono::Utc::now().fixed_offset();
//! let view = build_view(&events, &query, &settings, now);
//! assert_eq!(view.stats.net_movement, 6);
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod services;
pub mod source;

#[cfg(feature = "http-server")]
pub mod http;
