//! Clock helpers shared by the store and the pulse engine.
//!
//! Interaction timestamps must be non-decreasing in insertion order
//! (spec invariant vi) and are stamped at the moment the store's lock
//! accepts them, not from caller-supplied values — mirrors the
//! teacher's `now_ms()` used at the point of scheduling, not at the
//! point of intent creation.

use chrono::{DateTime, Utc};

/// Milliseconds since the Unix epoch, monotonic enough for ordering
/// interactions and decaying demand within a single process lifetime.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// RFC3339 / ISO-8601 UTC timestamp, used for pulse history entries and
/// training log lines.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

pub fn iso_from_ms(ms: u64) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
