//! Error types for pmq-controls.

use thiserror::Error;

/// Controls error types.
///
/// These are caller-contract violations, not recoverable business conditions:
/// a host that feeds non-monotonic time into a bucket or throttle has a bug,
/// and the operation must abort loudly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlsError {
    #[error("Time must be non-decreasing: now={now_ms} < last={last_ms}")]
    NonMonotonicTime { now_ms: u64, last_ms: u64 },

    #[error("Invalid controls config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for controls operations.
pub type ControlsResult<T> = std::result::Result<T, ControlsError>;
