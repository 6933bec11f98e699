//! The `log` command: lists records newest first.

use std::io::Write;

use anyhow::Result;
use sl_core::{RecordView, SleepEntry, format_timestamp};
use sl_store::{LineStore, SleepLog};

use super::util::format_hours;

/// Formats records as a table.
pub fn format_records(entries: &[SleepEntry]) -> String {
    if entries.is_empty() {
        return "No records.\n".to_string();
    }

    let mut output = format!("{:<18}{:<18}{:>6}\n", "SLEEP", "WAKE", "HOURS");
    for entry in entries {
        let wake = entry
            .wake_end
            .map_or_else(|| "-".to_string(), format_timestamp);
        output.push_str(&format!(
            "{:<18}{wake:<18}{:>6}\n",
            format_timestamp(entry.sleep_start),
            format_hours(entry.hours())
        ));
    }
    output
}

/// Formats records as a JSON array.
pub fn format_records_json(entries: &[SleepEntry]) -> Result<String> {
    let views: Vec<RecordView> = entries.iter().map(RecordView::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

/// Runs the log command.
pub fn run<S: LineStore, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    offset: usize,
    limit: usize,
    json: bool,
) -> Result<()> {
    let entries = log.list_records(offset, limit)?;
    if json {
        writeln!(writer, "{}", format_records_json(&entries)?)?;
    } else {
        write!(writer, "{}", format_records(&entries))?;
    }
    Ok(())
}
