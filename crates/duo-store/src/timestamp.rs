//! Timestamp encoding for the `chat_messages` table.
//!
//! A timestamp is stored as two INTEGER columns: whole seconds since the Unix
//! epoch and the sub-second nanoseconds. Comparing the pair lexicographically
//! (`(secs, nanos) > (?, ?)`) agrees with chronological order over the whole
//! `DateTime<Utc>` range, including years before 0 and after 9999.

use chrono::{DateTime, SecondsFormat, Utc};

/// `(seconds, nanoseconds)` as written to `timestamp_secs` / `timestamp_nanos`.
pub fn encode(ts: &DateTime<Utc>) -> (i64, i64) {
    (ts.timestamp(), i64::from(ts.timestamp_subsec_nanos()))
}

/// Inverse of [`encode`]; `None` when the pair is outside chrono's range.
pub fn decode(secs: i64, nanos: i64) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(nanos).ok()?;
    DateTime::from_timestamp(secs, nanos)
}

/// RFC 3339 text with nanosecond precision and a `Z` suffix, for API output.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
