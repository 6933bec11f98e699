//! CLI subcommand implementations.
//!
//! Each command writes to a caller-supplied writer and takes the current time
//! as a parameter, so output is testable without a terminal or a clock.

pub mod daily;
pub mod edit;
pub mod export;
pub mod log;
pub mod mtime;
pub mod record;
pub mod stats;
pub mod status;
pub mod util;
