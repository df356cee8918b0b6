//! Timestamp conversions.
//!
//! Rows store epoch milliseconds; the wire carries ISO-8601 strings with
//! millisecond precision and a `Z` suffix.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serializer;

use crate::error::SharedError;

/// Current time truncated to whole milliseconds, so it survives a round trip
/// through the store unchanged.
pub fn now() -> DateTime<Utc> {
    from_millis(Utc::now().timestamp_millis())
}

pub fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_default()
}

pub fn to_wire(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a pagination cursor. Accepts RFC 3339 or epoch milliseconds.
pub fn parse_cursor(raw: &str) -> Result<DateTime<Utc>, SharedError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .ok_or_else(|| SharedError::InvalidTimestamp(raw.to_string()))
}

/// `serialize_with` helper for wire DTOs.
pub fn serialize_wire<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&to_wire(ts))
}
