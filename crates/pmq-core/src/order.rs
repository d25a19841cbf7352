//! Order-related types and identifiers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::{Price, Size};

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for position calculations).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order book side for market-data deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Bid,
    Ask,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// Venue-assigned order identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Market identifier (the venue's outcome-token id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(String);

impl MarketId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarketId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A quote the strategy wants resting. Ephemeral: recomputed every cycle,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredOrder {
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
}

/// An order currently resting on the venue, as reconstructed from user events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveOrder {
    pub id: OrderId,
    pub side: OrderSide,
    pub price: Price,
    /// Remaining unfilled size. An order stays live at zero remaining until
    /// the venue sends an explicit close or cancel.
    pub remaining: Size,
}

impl LiveOrder {
    /// Deterministic ordering: side, then price, then id.
    pub fn sort_key_cmp(a: &LiveOrder, b: &LiveOrder) -> Ordering {
        a.side
            .cmp(&b.side)
            .then_with(|| a.price.cmp(&b.price))
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn test_order_side_sign() {
        assert_eq!(OrderSide::Buy.sign(), 1);
        assert_eq!(OrderSide::Sell.sign(), -1);
    }

    #[test]
    fn test_live_order_sort_key() {
        let a = LiveOrder {
            id: OrderId::from("o2"),
            side: OrderSide::Buy,
            price: Price::new(dec!(0.49)),
            remaining: Size::new(dec!(1)),
        };
        let b = LiveOrder {
            id: OrderId::from("o1"),
            side: OrderSide::Buy,
            price: Price::new(dec!(0.49)),
            remaining: Size::new(dec!(1)),
        };
        let c = LiveOrder {
            id: OrderId::from("o3"),
            side: OrderSide::Sell,
            price: Price::new(dec!(0.40)),
            remaining: Size::new(dec!(1)),
        };
        let mut v = vec![a.clone(), c.clone(), b.clone()];
        v.sort_by(LiveOrder::sort_key_cmp);
        assert_eq!(v, vec![b, a, c]);
    }

    #[test]
    fn test_side_serde_codes() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&BookSide::Bid).unwrap(), "\"bid\"");
    }
}
