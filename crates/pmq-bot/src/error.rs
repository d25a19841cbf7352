//! Error types for the pmq-bot host.

use thiserror::Error;

/// Host error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Engine(#[from] pmq_engine::EngineError),

    #[error(transparent)]
    Telemetry(#[from] pmq_telemetry::TelemetryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Runner task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for host operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
