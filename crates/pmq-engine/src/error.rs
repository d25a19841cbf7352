//! Error types for pmq-engine.

use thiserror::Error;

/// Engine error types.
///
/// Everything here is the fatal class: contract breaches between the engine
/// and its event sources or host. Business conditions (stale data, resync,
/// rejected executions) never surface as errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    State(#[from] pmq_state::StateError),

    #[error(transparent)]
    Controls(#[from] pmq_controls::ControlsError),

    #[error(transparent)]
    Strategy(#[from] pmq_strategy::StrategyError),

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
