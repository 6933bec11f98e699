//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal sleep log.
///
/// Records when you fall asleep and wake up, and reports how much you slept
/// per day with rolling averages.
#[derive(Debug, Parser)]
#[command(name = "sleeplog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record falling asleep.
    Sleep {
        /// When it happened, e.g. "2024-01-01T23:00" or "20 minutes ago".
        /// Defaults to now, rounded to the half hour.
        when: Option<String>,
    },

    /// Record waking up, closing the open sleep record.
    Wake {
        /// When it happened, e.g. "2024-01-02T07:00" or "1 hour ago".
        /// Defaults to now, rounded to the half hour.
        when: Option<String>,
    },

    /// List records, newest first.
    Log {
        /// Number of records to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of records to show (defaults to the configured page size).
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show summary statistics over all records.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show rolling daily averages and a 30-day chart.
    Daily {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Also list the last N days of the daily allocation.
        #[arg(long)]
        days: Option<usize>,
    },

    /// Show whether you are asleep or awake, and for how long.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the raw log, newest line first.
    Export,

    /// Replace the whole log with newest-first lines from a file or stdin.
    Edit {
        /// Read from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the log's last modification time as Unix seconds (0 if none).
    Mtime,
}
