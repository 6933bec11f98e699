//! Implementation of the `sleeplog export` command.
//!
//! Prints the raw log newest line first, in the form `sleeplog edit` accepts,
//! so `export`, hand edit, `edit` is a lossless round trip.

use std::io::Write;

use anyhow::{Context, Result};
use sl_store::{LineStore, SleepLog};

/// Runs the export command.
pub fn run<S: LineStore, W: Write>(writer: &mut W, log: &SleepLog<S>) -> Result<()> {
    let text = log.export_text()?;
    writer
        .write_all(text.as_bytes())
        .context("failed to write export")?;
    Ok(())
}
