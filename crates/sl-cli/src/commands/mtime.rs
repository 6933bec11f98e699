//! Implementation of the `sleeplog mtime` command.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use sl_store::{LineStore, SleepLog};

/// Seconds since the Unix epoch, 0 for no timestamp.
pub fn unix_seconds(modified: Option<SystemTime>) -> u64 {
    modified
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Prints when the log last changed, so callers can poll for updates.
pub fn run<S: LineStore, W: Write>(writer: &mut W, log: &SleepLog<S>) -> Result<()> {
    writeln!(writer, "{}", unix_seconds(log.last_modified()?))?;
    Ok(())
}
