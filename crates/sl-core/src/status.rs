//! Current sleep/wake state and time since the latest event.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::record::SleepEntry;

/// Granularity of the elapsed-time display, in seconds (30 minutes).
const ELAPSED_STEP_SECONDS: u64 = 30 * 60;

/// Whether the user is currently asleep or awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepState {
    /// The latest record has no wake time yet.
    Sleep,
    /// The latest record is complete, or there is no record at all.
    Wake,
}

impl SleepState {
    /// String representation used in JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Wake => "wake",
        }
    }

    /// Human-readable label for status lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sleep => "Sleeping",
            Self::Wake => "Awake",
        }
    }
}

impl fmt::Display for SleepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derives the current state from the latest record.
pub fn current_state(latest: Option<&SleepEntry>) -> SleepState {
    match latest {
        Some(entry) if entry.is_open() => SleepState::Sleep,
        _ => SleepState::Wake,
    }
}

/// Signed time since the latest event, rounded to the nearest 30 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Elapsed {
    /// The latest event lies in the future.
    pub negative: bool,
    pub hours: u64,
    pub minutes: u64,
}

impl Elapsed {
    /// Rounds a signed difference in seconds. Halves round away from zero.
    pub const fn from_seconds(seconds: i64) -> Self {
        let steps = (seconds.unsigned_abs() + ELAPSED_STEP_SECONDS / 2) / ELAPSED_STEP_SECONDS;
        let total_minutes = steps * (ELAPSED_STEP_SECONDS / 60);
        Self {
            negative: seconds < 0,
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    const fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative && !self.is_zero() { "-" } else { "" };
        write!(f, "{sign}{:02}:{:02}", self.hours, self.minutes)
    }
}

/// Time from the latest event (wake if present, else sleep) to `now`.
pub fn elapsed_since(latest: Option<&SleepEntry>, now: NaiveDateTime) -> Option<Elapsed> {
    let latest = latest?;
    Some(Elapsed::from_seconds(
        (now - latest.latest_timestamp()).num_seconds(),
    ))
}
