//! Validation errors for user-supplied values.

use thiserror::Error;

/// Validation errors for timestamps and record fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value could not be parsed as a timestamp.
    #[error("invalid timestamp: {value:?}")]
    InvalidTimestamp { value: String },
}
