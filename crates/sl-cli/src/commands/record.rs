//! The `sleep` and `wake` commands.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use sl_core::format_timestamp;
use sl_store::{LineStore, SleepLog};

use super::util::{format_hours, parse_when};

/// Records falling asleep.
pub fn sleep<S: LineStore, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    when: Option<&str>,
    now: NaiveDateTime,
) -> Result<()> {
    let at = parse_when(when, now)?;
    let entry = log.record_sleep(at)?;
    writeln!(writer, "Asleep at {}", format_timestamp(entry.sleep_start))?;
    Ok(())
}

/// Records waking up.
pub fn wake<S: LineStore, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    when: Option<&str>,
    now: NaiveDateTime,
) -> Result<()> {
    let at = parse_when(when, now)?;
    let entry = log.record_wake(at)?;
    writeln!(
        writer,
        "Awake at {} after {}h",
        format_timestamp(entry.latest_timestamp()),
        format_hours(entry.hours())
    )?;
    Ok(())
}
