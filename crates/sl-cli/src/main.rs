use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sl_cli::commands::{daily, edit, export, log, mtime, record, stats, status};
use sl_cli::{Cli, Commands, Config};
use sl_store::SleepLog;

/// Load config and open the sleep log it points at.
fn open_log(config_path: Option<&Path>) -> Result<(SleepLog, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let log = SleepLog::open(&config.log_path);
    Ok((log, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (sleep_log, config) = open_log(cli.config.as_deref())?;
    let now = Local::now().naive_local();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Sleep { when } => {
            record::sleep(&mut out, &sleep_log, when.as_deref(), now)?;
        }
        Commands::Wake { when } => {
            record::wake(&mut out, &sleep_log, when.as_deref(), now)?;
        }
        Commands::Log {
            offset,
            limit,
            json,
        } => log::run(
            &mut out,
            &sleep_log,
            *offset,
            limit.unwrap_or(config.page_size),
            *json,
        )?,
        Commands::Stats { json } => stats::run(&mut out, &sleep_log, now, *json)?,
        Commands::Daily { json, days } => {
            daily::run(&mut out, &sleep_log, now.date(), *json, *days)?;
        }
        Commands::Status { json } => status::run(&mut out, &sleep_log, now, *json)?,
        Commands::Export => export::run(&mut out, &sleep_log)?,
        Commands::Edit { file } => match file {
            Some(path) => {
                let mut reader = File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                edit::run(&mut out, &sleep_log, &mut reader)?;
            }
            None => edit::run(&mut out, &sleep_log, &mut io::stdin().lock())?,
        },
        Commands::Mtime => mtime::run(&mut out, &sleep_log)?,
    }

    out.flush()?;
    Ok(())
}
