//! Error types for pmq-telemetry.

use thiserror::Error;

/// Telemetry error types.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    #[error("Journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Journal serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for telemetry operations.
pub type TelemetryResult<T> = std::result::Result<T, TelemetryError>;
