//! Parsing stored log lines into sleep entries.
//!
//! Each stored line holds two or more comma-separated fields: the sleep
//! timestamp, the wake timestamp (empty while still asleep), and any number of
//! opaque trailing columns that are carried along untouched.
//!
//! Parsing is accept-or-drop: a line that fails validation becomes
//! [`ParsedLine::Skipped`] and is left out of every read result.

use std::ops::Range;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::stats::round2;
use crate::timestamp::{self, format_timestamp, parse_timestamp};

/// Records returned per page by default.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Records read when computing statistics, enough to cover a whole history.
pub const STATS_RECORD_LIMIT: usize = 1000;

/// One sleep session.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepEntry {
    /// When the session started.
    pub sleep_start: NaiveDateTime,

    /// When the session ended, `None` while still asleep.
    pub wake_end: Option<NaiveDateTime>,

    /// Columns beyond the two timestamps, kept verbatim.
    pub extra: Vec<String>,
}

impl SleepEntry {
    /// Creates an open entry (currently asleep).
    pub const fn open(sleep_start: NaiveDateTime) -> Self {
        Self {
            sleep_start,
            wake_end: None,
            extra: Vec::new(),
        }
    }

    /// Creates a completed entry.
    pub const fn completed(sleep_start: NaiveDateTime, wake_end: NaiveDateTime) -> Self {
        Self {
            sleep_start,
            wake_end: Some(wake_end),
            extra: Vec::new(),
        }
    }

    /// Returns true while the session has no wake time.
    pub const fn is_open(&self) -> bool {
        self.wake_end.is_none()
    }

    /// Elapsed hours rounded to two decimals, `None` for an open entry.
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> Option<f64> {
        self.wake_end
            .map(|wake| round2((wake - self.sleep_start).num_seconds() as f64 / 3600.0))
    }

    /// The most recent timestamp on this entry: wake if present, else sleep.
    pub fn latest_timestamp(&self) -> NaiveDateTime {
        self.wake_end.unwrap_or(self.sleep_start)
    }

    /// Renders the entry as a stored line (without trailing newline).
    pub fn to_line(&self) -> Result<String, csv::Error> {
        let mut fields = vec![
            format_timestamp(self.sleep_start),
            self.wake_end.map(format_timestamp).unwrap_or_default(),
        ];
        fields.extend(self.extra.iter().cloned());
        join_fields(&fields)
    }
}

/// Why a stored line was left out of a read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("unreadable CSV: {0}")]
    Csv(String),

    #[error("expected at least 2 fields, found {0}")]
    TooFewFields(usize),

    #[error("sleep field is empty")]
    EmptySleep,

    #[error("invalid sleep timestamp {0:?}")]
    InvalidSleep(String),

    #[error("invalid wake timestamp {0:?}")]
    InvalidWake(String),
}

/// Outcome of parsing one stored line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Valid(SleepEntry),
    Skipped(SkipReason),
}

impl ParsedLine {
    /// Returns the entry if the line was valid.
    pub fn into_entry(self) -> Option<SleepEntry> {
        match self {
            Self::Valid(entry) => Some(entry),
            Self::Skipped(_) => None,
        }
    }
}

/// Order of the raw lines handed to [`parse_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrder {
    /// Append order, as stored on disk.
    OldestFirst,
    /// Reverse append order, as shown in the edit view.
    NewestFirst,
}

/// A window into the newest-first record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Valid entries to skip.
    pub offset: usize,
    /// Maximum entries to return.
    pub limit: usize,
}

impl Page {
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// The first `limit` entries.
    pub const fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Splits a stored line into its CSV fields.
pub fn split_fields(line: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(str::to_string).collect())
}

/// Joins fields into a stored line, quoting only where CSV requires it.
pub fn join_fields<S: AsRef<[u8]>>(fields: &[S]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let line = String::from_utf8_lossy(&bytes);
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Byte range of field `index` within a raw line, quotes included.
///
/// Works on undecoded bytes so that a line can be edited in place without
/// touching anything outside the field. A quote only opens a quoted field at
/// the start of the field, matching how [`split_fields`] reads it.
pub fn field_span(line: &[u8], index: usize) -> Option<Range<usize>> {
    let mut field = 0;
    let mut start = 0;
    let mut quoted = false;
    let mut at_field_start = true;
    let mut i = 0;

    while i < line.len() {
        let byte = line[i];
        if quoted {
            if byte == b'"' {
                if line.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    quoted = false;
                }
            }
        } else if byte == b'"' && at_field_start {
            quoted = true;
        } else if byte == b',' {
            if field == index {
                return Some(start..i);
            }
            field += 1;
            start = i + 1;
            at_field_start = true;
            i += 1;
            continue;
        }
        at_field_start = false;
        i += 1;
    }

    (field == index).then_some(start..line.len())
}

/// Rewrites `YYYY-MM-DD HH:MM` timestamps in the sleep and wake fields to the
/// canonical `T` separator. Everything else in the line is kept as is.
pub fn canonicalize_line(line: &str) -> String {
    let mut line = line.to_string();
    for index in 0..2 {
        let Some(span) = field_span(line.as_bytes(), index) else {
            break;
        };
        let field = &line[span.clone()];
        let leading = field.len() - field.trim_start().len();
        let value = field.trim();
        if value.as_bytes().get(10) == Some(&b' ') && parse_timestamp(value).is_ok() {
            let at = span.start + leading + 10;
            line.replace_range(at..=at, "T");
        }
    }
    line
}

/// Parses and validates one stored line.
pub fn parse_line(line: &str) -> ParsedLine {
    let fields = match split_fields(line) {
        Ok(fields) => fields,
        Err(e) => return ParsedLine::Skipped(SkipReason::Csv(e.to_string())),
    };
    if fields.len() < 2 {
        return ParsedLine::Skipped(SkipReason::TooFewFields(fields.len()));
    }

    let sleep = fields[0].trim();
    let wake = fields[1].trim();
    if sleep.is_empty() {
        return ParsedLine::Skipped(SkipReason::EmptySleep);
    }

    let Ok(sleep_start) = parse_timestamp(sleep) else {
        return ParsedLine::Skipped(SkipReason::InvalidSleep(sleep.to_string()));
    };
    let wake_end = if wake.is_empty() {
        None
    } else {
        match parse_timestamp(wake) {
            Ok(ts) => Some(ts),
            Err(_) => return ParsedLine::Skipped(SkipReason::InvalidWake(wake.to_string())),
        }
    };

    ParsedLine::Valid(SleepEntry {
        sleep_start,
        wake_end,
        extra: fields[2..].to_vec(),
    })
}

/// Parses raw lines into newest-first entries, dropping invalid lines.
///
/// `page.offset` counts valid entries, so paging through the result never
/// repeats or loses a record because of a bad line in between.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], order: LineOrder, page: Page) -> Vec<SleepEntry> {
    let newest_first: Box<dyn Iterator<Item = &S> + '_> = match order {
        LineOrder::OldestFirst => Box::new(lines.iter().rev()),
        LineOrder::NewestFirst => Box::new(lines.iter()),
    };

    newest_first
        .filter_map(|line| {
            let line: &str = line.as_ref();
            if line.trim().is_empty() {
                return None;
            }
            match parse_line(line) {
                ParsedLine::Valid(entry) => Some(entry),
                ParsedLine::Skipped(reason) => {
                    tracing::debug!(%reason, line, "skipping stored line");
                    None
                }
            }
        })
        .skip(page.offset)
        .take(page.limit)
        .collect()
}

/// The most recent valid entry, if any.
///
/// Recomputed from the lines on every call: appends and bulk edits can change
/// it at any time.
pub fn latest_entry<S: AsRef<str>>(lines: &[S], order: LineOrder) -> Option<SleepEntry> {
    parse_lines(lines, order, Page::first(1)).into_iter().next()
}

/// One row of the record listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    #[serde(with = "timestamp::canonical")]
    pub sleep: NaiveDateTime,
    #[serde(with = "timestamp::canonical_option")]
    pub wake: Option<NaiveDateTime>,
    pub hours: Option<f64>,
}

impl From<&SleepEntry> for RecordView {
    fn from(entry: &SleepEntry) -> Self {
        Self {
            sleep: entry.sleep_start,
            wake: entry.wake_end,
            hours: entry.hours(),
        }
    }
}
