//! Errors returned by the sleep log.

use chrono::NaiveDateTime;
use sl_core::format_timestamp;
use thiserror::Error;

/// Errors from reading or mutating the log.
///
/// Every mutation is validated before anything is written, so a rejected
/// operation leaves the log exactly as it was.
#[derive(Debug, Error)]
pub enum LogError {
    /// An error from the underlying storage.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded as a line.
    #[error("failed to encode record: {0}")]
    Csv(#[from] csv::Error),

    /// Sleep was recorded while a session is still open.
    #[error("already asleep since {}", stamp(.since))]
    AlreadyAsleep { since: NaiveDateTime },

    /// Wake was recorded with no open session to close.
    #[error("no open sleep record to close")]
    NotAsleep,

    /// The new timestamp does not come after everything already recorded.
    #[error(
        "{} is not after the latest recorded time {}",
        stamp(.requested),
        stamp(.latest)
    )]
    NotAfterLatest {
        requested: NaiveDateTime,
        latest: NaiveDateTime,
    },
}

impl LogError {
    /// True for precondition violations, as opposed to storage failures.
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyAsleep { .. } | Self::NotAsleep | Self::NotAfterLatest { .. }
        )
    }
}

fn stamp(ts: &NaiveDateTime) -> String {
    format_timestamp(*ts)
}
