//! Error types.
//!
//! Every failure is terminal for a run: nothing here is retried, and a
//! malformed record is never skipped.

use std::io;

/// Errors produced while configuring or running a selection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A line of input could not be turned into a record.
    ///
    /// `line` is 1-based; 0 means the record did not come from a line source.
    #[error("parse error at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// Sampling needs at least `required` records to seed the reservoir.
    #[error("stream has {available} records, need at least {required} to fill the reservoir")]
    InsufficientStream { required: usize, available: u64 },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Reading or writing the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
