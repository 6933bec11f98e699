//! The `stats` command: summary statistics over all records.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use sl_core::{SleepSummary, format_timestamp};
use sl_store::{LineStore, SleepLog};

/// Formats the human-readable summary.
pub fn format_summary(summary: &SleepSummary) -> String {
    let Some(start) = summary.start_date else {
        return "No records.\n".to_string();
    };

    let mut output = String::new();
    output.push_str(&format!(
        "Records:   {} ({} complete)\n",
        summary.total_records, summary.complete_records
    ));
    output.push_str(&format!("Average:   {:.2}h\n", summary.average));
    output.push_str(&format!("Shortest:  {:.2}h\n", summary.min));
    output.push_str(&format!("Longest:   {:.2}h\n", summary.max));
    output.push_str(&format!(
        "Since:     {} ({} days)\n",
        format_timestamp(start),
        summary.days_elapsed
    ));
    output
}

/// Runs the stats command.
pub fn run<S: LineStore, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let summary = log.stats(now)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        write!(writer, "{}", format_summary(&summary))?;
    }
    Ok(())
}
