//! Error types for pmq-state.

use pmq_core::{OrderId, Size};
use thiserror::Error;

/// Protocol-violation errors from the event-sourced trackers.
///
/// Every variant indicates a broken contract with the event source, not a
/// business condition; masking any of them risks silent state corruption.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("order_open: duplicate order id {0}")]
    DuplicateOrderId(OrderId),

    #[error("{event}: unknown order id {order_id}")]
    UnknownOrderId { event: &'static str, order_id: OrderId },

    #[error("fill: size {fill} exceeds remaining {remaining} on order {order_id}")]
    FillExceedsRemaining {
        order_id: OrderId,
        fill: Size,
        remaining: Size,
    },

    #[error("{event}: size must be > 0, got {size}")]
    NonPositiveSize { event: &'static str, size: Size },
}

/// Result type alias for state operations.
pub type StateResult<T> = std::result::Result<T, StateError>;
