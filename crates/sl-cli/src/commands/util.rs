//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use sl_core::{parse_timestamp, suggested_entry_time};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Resolves the timestamp argument of `sleep` and `wake`.
///
/// Supports:
/// - nothing: `now` plus 15 minutes, snapped down to the half hour
/// - a timestamp: "2024-01-15T23:30", "2024-01-15 23:30:00", RFC 3339
/// - relative time: "20 minutes ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_when(input: Option<&str>, now: NaiveDateTime) -> anyhow::Result<NaiveDateTime> {
    let Some(s) = input.map(str::trim) else {
        return Ok(suggested_entry_time(now));
    };

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        return parse_timestamp(s).with_context(|| {
            format!(
                "invalid time '{s}'. Use YYYY-MM-DDTHH:MM (e.g., 2024-01-15T23:30) or relative (e.g., '20 minutes ago')"
            )
        });
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Formats a record's hours for tables: two decimals, `-` while open.
pub fn format_hours(hours: Option<f64>) -> String {
    hours.map_or_else(|| "-".to_string(), |h| format!("{h:.2}"))
}
