//! Field resolution for heterogeneous provider payloads.
//!
//! A logical field (publication time, image URL) may live under several key names depending on
//! the provider. Each logical field gets an explicit priority table of accessors; the first
//! accessor that yields a value wins. Absent and `null` keys both resolve to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// One entry of a priority table: the provider key name and how to read it.
pub struct Candidate<R> {
    pub key: &'static str,
    pub get: fn(&R) -> Option<&str>,
}

impl<R> Clone for Candidate<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Candidate<R> {}

impl<R> std::fmt::Debug for Candidate<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate").field("key", &self.key).finish()
    }
}

/// First present value in priority order, or `None`.
pub fn resolve<'r, R>(record: &'r R, candidates: &[Candidate<R>]) -> Option<&'r str> {
    resolve_keyed(record, candidates).map(|(_, v)| v)
}

/// Like [`resolve`], also reporting which key matched.
pub fn resolve_keyed<'r, R>(
    record: &'r R,
    candidates: &[Candidate<R>],
) -> Option<(&'static str, &'r str)> {
    candidates
        .iter()
        .find_map(|c| (c.get)(record).map(|v| (c.key, v)))
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a provider timestamp into a UTC instant.
///
/// Accepts RFC 3339, offset-less date-times (read as UTC, optional trailing `Z`, as DONKI emits
/// `2025-02-01T03:21Z`), and plain dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Sort key in epoch milliseconds. Absent or unparseable timestamps sort as epoch zero.
pub fn sort_millis(raw: Option<&str>) -> i64 {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Compact relative age: `42s ago`, `5m ago`, `3h ago`, `2d ago`. Empty when unparseable.
pub fn time_ago(now: DateTime<Utc>, raw: Option<&str>) -> String {
    let Some(then) = raw.and_then(parse_timestamp) else {
        return String::new();
    };
    let secs = (now - then).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s ago", s),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}
