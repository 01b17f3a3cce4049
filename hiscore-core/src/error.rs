//! Error type shared by the snapshot operations.

use thiserror::Error;

/// Errors raised by snapshot decoding, aggregation and rule configuration.
///
/// Missing snapshots are not errors: the formatter and validator treat
/// absence as meaningful input. Only operations that are undefined on an
/// empty population fail.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("invalid snapshots list, failed to find {operation}")]
    EmptySnapshots { operation: &'static str },
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
    #[error("snapshot field `{key}` is invalid: {reason}")]
    InvalidField { key: String, reason: &'static str },
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidRule { field: &'static str, value: f64 },
}
