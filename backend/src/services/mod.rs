//! The filtering core and the view built on top of it.
//!
//! Everything here is synchronous and free of I/O. Data flows
//! `ingest` → `filter` (using `range_resolver`) → `ordering` → `aggregator`,
//! and `dashboard` runs that pipeline for one query.

pub mod aggregator;
pub mod checksum;
pub mod dashboard;
pub mod filter;
pub mod ingest;
pub mod ordering;
pub mod range_resolver;

pub use aggregator::{
    latest_by_device, recent_deltas, stats, timeline, CounterRoles, DeltaPoint, NetMovementMode,
    Stats, TimelinePoint,
};
pub use checksum::payload_fingerprint;
pub use dashboard::{build_view, DashboardView, ViewSettings};
pub use filter::filter;
pub use ingest::normalize;
pub use ordering::{sort_descending_by_timestamp, take_top};
pub use range_resolver::RangeResolver;
