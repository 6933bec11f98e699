//! The sleep log service: reads, statistics and guarded mutations.

use std::ops::Range;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{NaiveDate, NaiveDateTime};
use sl_core::timestamp::truncate_to_minute;
use sl_core::{
    DailyStats, Elapsed, LineOrder, Page, ParsedLine, STATS_RECORD_LIMIT, SleepEntry, SleepState,
    SleepSummary, canonicalize_line, current_state, daily_stats, elapsed_since, field_span,
    format_timestamp, latest_entry, parse_line, parse_lines, summarize,
};

use crate::error::LogError;
use crate::store::{FileStore, LineStore, MemoryStore};

/// A single user's sleep log on top of a [`LineStore`].
///
/// Nothing is cached: every call reads the store again, so appends and bulk
/// edits from elsewhere are always visible.
#[derive(Debug)]
pub struct SleepLog<S = FileStore> {
    store: S,
}

impl SleepLog<FileStore> {
    /// Opens the log file at `path`. A missing file is an empty log.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStore::new(path))
    }
}

impl SleepLog<MemoryStore> {
    /// Opens an empty in-memory log.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: LineStore> SleepLog<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn entries(&self, page: Page) -> Result<Vec<SleepEntry>, LogError> {
        let lines = self.store.read_lines()?;
        Ok(parse_lines(&lines, LineOrder::OldestFirst, page))
    }

    /// Lists records newest first, skipping `offset` and returning at most `limit`.
    pub fn list_records(&self, offset: usize, limit: usize) -> Result<Vec<SleepEntry>, LogError> {
        self.entries(Page::new(offset, limit))
    }

    /// Summary statistics over the most recent records.
    pub fn stats(&self, now: NaiveDateTime) -> Result<SleepSummary, LogError> {
        let entries = self.entries(Page::first(STATS_RECORD_LIMIT))?;
        Ok(summarize(&entries, now))
    }

    /// Daily allocation and rolling averages over the most recent records.
    pub fn daily_stats(&self, today: NaiveDate) -> Result<DailyStats, LogError> {
        let entries = self.entries(Page::first(STATS_RECORD_LIMIT))?;
        Ok(daily_stats(&entries, today))
    }

    /// The most recent valid record.
    pub fn latest_entry(&self) -> Result<Option<SleepEntry>, LogError> {
        let lines = self.store.read_lines()?;
        Ok(latest_entry(&lines, LineOrder::OldestFirst))
    }

    /// Whether the user is currently asleep. An empty log means awake.
    pub fn status(&self) -> Result<SleepState, LogError> {
        Ok(current_state(self.latest_entry()?.as_ref()))
    }

    /// Time since the latest event, `None` for an empty log.
    pub fn elapsed(&self, now: NaiveDateTime) -> Result<Option<Elapsed>, LogError> {
        Ok(elapsed_since(self.latest_entry()?.as_ref(), now))
    }

    /// Starts a new session at `at` (truncated to the minute).
    ///
    /// Rejected while a session is open, or unless `at` is strictly later than
    /// the latest recorded timestamp.
    pub fn record_sleep(&self, at: NaiveDateTime) -> Result<SleepEntry, LogError> {
        let at = truncate_to_minute(at);
        let _lock = self.store.lock()?;
        let lines = self.store.read_lines()?;

        if let Some(latest) = latest_entry(&lines, LineOrder::OldestFirst) {
            if latest.is_open() {
                return Err(LogError::AlreadyAsleep {
                    since: latest.sleep_start,
                });
            }
            ensure_after(at, &latest)?;
        }

        let entry = SleepEntry::open(at);
        self.store.append_line(&entry.to_line()?)?;
        tracing::info!(sleep = %format_timestamp(at), "recorded sleep");
        Ok(entry)
    }

    /// Closes the open session at `at` (truncated to the minute).
    ///
    /// Only the bytes of the open record's wake field change. Every other
    /// byte of the log, including line endings, undecodable text and the
    /// quoting of extra columns, is written back as it was read.
    pub fn record_wake(&self, at: NaiveDateTime) -> Result<SleepEntry, LogError> {
        let at = truncate_to_minute(at);
        let _lock = self.store.lock()?;
        let raw = self.store.read_raw()?;

        let Some((line, latest)) = last_valid_line(&raw) else {
            return Err(LogError::NotAsleep);
        };
        if !latest.is_open() {
            return Err(LogError::NotAsleep);
        }
        ensure_after(at, &latest)?;

        // A valid line always has a wake field, possibly empty.
        let Some(wake) = field_span(&raw[line.clone()], 1) else {
            return Err(LogError::NotAsleep);
        };
        let wake = line.start + wake.start..line.start + wake.end;

        let stamp = format_timestamp(at);
        let mut updated = Vec::with_capacity(raw.len() + stamp.len());
        updated.extend_from_slice(&raw[..wake.start]);
        updated.extend_from_slice(stamp.as_bytes());
        updated.extend_from_slice(&raw[wake.end..]);
        self.store.overwrite_all(&updated)?;

        tracing::info!(
            sleep = %format_timestamp(latest.sleep_start),
            wake = %stamp,
            "recorded wake"
        );
        Ok(SleepEntry {
            wake_end: Some(at),
            ..latest
        })
    }

    /// Replaces the whole log with a newest-first text blob.
    ///
    /// Lines are stored oldest first, with `YYYY-MM-DD HH:MM` timestamps in
    /// the first two fields rewritten to the canonical `T` form. No other
    /// validation happens: bad lines are only dropped later when read back.
    /// Returns the number of lines written.
    pub fn replace_all(&self, text: &str) -> Result<usize, LogError> {
        let lines: Vec<String> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(canonicalize_line)
            .collect();

        let _lock = self.store.lock()?;
        self.store
            .overwrite_all(join_lines(lines.iter().rev()).as_bytes())?;
        tracing::info!(lines = lines.len(), "replaced log contents");
        Ok(lines.len())
    }

    /// The stored lines newest first, as accepted by [`Self::replace_all`].
    pub fn export_text(&self) -> Result<String, LogError> {
        let lines = self.store.read_lines()?;
        Ok(join_lines(lines.iter().rev()))
    }

    /// When the log last changed, for cheap change polling.
    pub fn last_modified(&self) -> Result<Option<SystemTime>, LogError> {
        Ok(self.store.last_modified()?)
    }
}

fn ensure_after(at: NaiveDateTime, latest: &SleepEntry) -> Result<(), LogError> {
    let latest = latest.latest_timestamp();
    if at <= latest {
        return Err(LogError::NotAfterLatest {
            requested: at,
            latest,
        });
    }
    Ok(())
}

/// Byte ranges of every line's content, without the `\n` or a trailing `\r`.
fn line_spans(raw: &[u8]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, byte) in raw.iter().enumerate() {
        if *byte == b'\n' {
            spans.push(start..i);
            start = i + 1;
        }
    }
    if start < raw.len() {
        spans.push(start..raw.len());
    }

    spans
        .into_iter()
        .map(|span| {
            if raw[span.clone()].ends_with(b"\r") {
                span.start..span.end - 1
            } else {
                span
            }
        })
        .collect()
}

/// Byte range and entry of the last line that parses.
fn last_valid_line(raw: &[u8]) -> Option<(Range<usize>, SleepEntry)> {
    line_spans(raw).into_iter().rev().find_map(|span| {
        match parse_line(&String::from_utf8_lossy(&raw[span.clone()])) {
            ParsedLine::Valid(entry) => Some((span, entry)),
            ParsedLine::Skipped(_) => None,
        }
    })
}

/// Joins lines with a trailing newline; empty input gives an empty string.
fn join_lines<I>(lines: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines.into_iter().fold(String::new(), |mut out, line| {
        out.push_str(line.as_ref());
        out.push('\n');
        out
    })
}
