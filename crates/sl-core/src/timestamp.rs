//! Local wall-clock timestamps as stored in the log.
//!
//! Records carry no timezone: every timestamp is the local wall-clock time at
//! which the user went to sleep or woke up. The canonical stored form is
//! `YYYY-MM-DDTHH:MM`.

use chrono::{DateTime, Duration, Local, NaiveDateTime, Timelike};

use crate::error::ValidationError;

/// Canonical format for stored timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Wall-clock formats accepted on input, tried in order.
const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a timestamp from a stored field or user input.
///
/// Accepts the canonical form, an optional seconds component, a space in
/// place of the `T`, and RFC 3339 (converted to local wall-clock).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ValidationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ValidationError::Empty { field: "timestamp" });
    }

    for format in INPUT_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    Err(ValidationError::InvalidTimestamp {
        value: s.to_string(),
    })
}

/// Formats a timestamp in the canonical stored form.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts - Duration::seconds(i64::from(ts.second()))
        - Duration::nanoseconds(i64::from(ts.nanosecond()))
}

/// Default timestamp offered when the user records without giving one.
///
/// Looks 15 minutes ahead and snaps down to the half hour, so 23:10 becomes
/// 23:00 and 23:20 becomes 23:30.
pub fn suggested_entry_time(now: NaiveDateTime) -> NaiveDateTime {
    let ahead = truncate_to_minute(now + Duration::minutes(15));
    ahead - Duration::minutes(i64::from(ahead.minute() % 30))
}

/// Serializes a timestamp in canonical form.
pub mod canonical {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*ts))
    }
}

/// Serializes an optional timestamp in canonical form, `null` when absent.
pub mod canonical_option {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    #[allow(clippy::ref_option, reason = "signature required by serde(with)")]
    pub fn serialize<S: Serializer>(
        ts: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format_timestamp(*ts)),
            None => serializer.serialize_none(),
        }
    }
}
