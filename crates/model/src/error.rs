//! Model Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A field was found but its value is not acceptable.
    #[display("invalid value for field '{field}': {value}")]
    InvalidField {
        /// The offending field, named as in the flat record.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl ErrorKind {
    pub(crate) fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidField { field, value: value.to_string() }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A record is either valid or it isn't.
        false
    }
}
