//! Implementation of the `sleeplog edit` command.
//!
//! Replaces the whole log with newest-first lines, as printed by
//! `sleeplog export`. Lines are stored as given; invalid ones are skipped when
//! the log is read.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use sl_store::{LineStore, SleepLog};

/// Runs the edit command, reading the new contents from `reader`.
pub fn run<S: LineStore, R: Read, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    reader: &mut R,
) -> Result<()> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("failed to read new log contents")?;
    let text = String::from_utf8_lossy(&bytes);

    let count = log.replace_all(&text)?;
    writeln!(writer, "Replaced log with {count} lines")?;
    Ok(())
}
