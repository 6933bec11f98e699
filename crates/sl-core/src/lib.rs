//! Core domain logic for the sleep log.
//!
//! This crate contains the fundamental types and logic for:
//! - Record parsing: turning stored lines into validated sleep entries
//! - Daily allocation: spreading sessions across the calendar days they touch
//! - Statistics: summary figures and trailing-window rolling averages
//! - Status: current sleep/wake state and time since the latest event

pub mod daily;
mod error;
pub mod record;
pub mod stats;
pub mod status;
pub mod timestamp;

pub use daily::{DailyAllocation, allocate_daily, split_session};
pub use error::ValidationError;
pub use record::{
    DEFAULT_PAGE_SIZE, LineOrder, Page, ParsedLine, RecordView, STATS_RECORD_LIMIT, SkipReason,
    SleepEntry, canonicalize_line, field_span, latest_entry, parse_line, parse_lines,
};
pub use stats::{
    CHART_DAYS, DailyHours, DailyStats, ROLLING_WINDOWS, RollingAverage, SleepSummary,
    daily_stats, summarize,
};
pub use status::{Elapsed, SleepState, current_state, elapsed_since};
pub use timestamp::{format_timestamp, parse_timestamp, suggested_entry_time};
