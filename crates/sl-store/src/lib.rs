//! Storage layer for the sleep log.
//!
//! The log is a plain comma-separated text file, one record per line in the
//! order records were added:
//!
//! ```text
//! 2024-01-01T23:00,2024-01-02T07:00
//! 2024-01-02T23:15,
//! ```
//!
//! The first column is the sleep time, the second the wake time (empty while
//! asleep). Any further columns are kept untouched.
//!
//! # Concurrency
//!
//! Every mutation takes an exclusive lock on `<log>.lock` next to the log for the
//! whole read-validate-write cycle, so two processes recording at the same
//! moment cannot both pass validation. Reads do not lock.

mod error;
mod log;
mod store;

pub use error::LogError;
pub use log::SleepLog;
pub use store::{FileStore, LineStore, MemoryStore, StoreLock};
