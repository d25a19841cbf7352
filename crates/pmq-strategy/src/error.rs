//! Error types for pmq-strategy.

use pmq_core::Price;
use thiserror::Error;

/// Strategy error types.
///
/// All variants are fatal invariant failures: the caller must not invoke the
/// quote computer with an invalid book or config, and a postcondition failure
/// means the tick arithmetic itself is broken.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Invalid quote config: {0}")]
    InvalidConfig(String),

    #[error("Crossed book: bid {bid} >= ask {ask}; cannot compute midpoint")]
    CrossedBook { bid: Price, ask: Price },

    #[error("Unable to quote on the tick grid within the (0,1) price domain")]
    SpreadUnrepresentable,

    #[error("Quote postcondition violated: {0}")]
    Postcondition(String),
}

/// Result type alias for strategy operations.
pub type StrategyResult<T> = std::result::Result<T, StrategyError>;
