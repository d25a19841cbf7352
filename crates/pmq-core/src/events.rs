//! Normalized feed events.
//!
//! The venue's wire formats are parsed upstream; by the time events reach this
//! crate they have the shapes below. Sequence numbers on market events are the
//! sole ordering authority for book reconstruction.

use serde::{Deserialize, Serialize};

use crate::order::{BookSide, OrderId, OrderSide};
use crate::{Price, Size};

/// One price level: `[price, size]` on the wire.
pub type BookLevel = (Price, Size);

/// Normalized market-channel event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// Full book snapshot. Replaces all local levels.
    Book {
        seq: u64,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
    },
    /// Single-level delta. `size` zero deletes the level.
    PriceChange {
        seq: u64,
        side: BookSide,
        price: Price,
        size: Size,
    },
}

impl MarketEvent {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Book { seq, .. } => *seq,
            Self::PriceChange { seq, .. } => *seq,
        }
    }
}

/// Normalized user-channel event.
///
/// `Fill` sizes are incremental, not cumulative: an adapter translating a
/// venue's cumulative `size_matched` field must difference it before emitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    OrderOpen {
        order_id: OrderId,
        side: OrderSide,
        price: Price,
        size: Size,
    },
    Fill {
        order_id: OrderId,
        side: OrderSide,
        price: Price,
        size: Size,
    },
    OrderCanceled {
        order_id: OrderId,
    },
    OrderClosed {
        order_id: OrderId,
    },
}

/// Deterministic event source for replay runs.
///
/// `step_market` advances the market by one step; the drains hand over
/// everything emitted since the last call, in emission order. The venue's
/// acks to execution calls surface through `drain_user` as well, which the
/// loop re-drains after each decision cycle.
pub trait FixtureFeed {
    fn step_market(&mut self);
    fn drain_market(&mut self) -> Vec<MarketEvent>;
    fn drain_user(&mut self) -> Vec<UserEvent>;
}
