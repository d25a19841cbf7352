//! Price-level maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pmq_core::{BookLevel, BookSide, Price, Size};

/// One side of the top of book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevel {
    pub price: Price,
    pub size: Size,
}

/// Bid/ask level maps keyed by price.
///
/// Invariant: no zero or negative sizes are ever stored; a size of zero
/// deletes the level.
#[derive(Debug, Clone, Default)]
pub struct BookLevels {
    bids: BTreeMap<Price, Size>,
    asks: BTreeMap<Price, Size>,
}

impl BookLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    /// Replace both sides wholesale from snapshot levels, skipping empties.
    pub fn replace_from_snapshot(&mut self, bids: &[BookLevel], asks: &[BookLevel]) {
        self.bids.clear();
        self.asks.clear();
        for &(price, size) in bids {
            if size.is_positive() {
                self.bids.insert(price, size);
            }
        }
        for &(price, size) in asks {
            if size.is_positive() {
                self.asks.insert(price, size);
            }
        }
    }

    /// Set one level; non-positive size deletes it.
    pub fn set_level(&mut self, side: BookSide, price: Price, size: Size) {
        let book = match side {
            BookSide::Bid => &mut self.bids,
            BookSide::Ask => &mut self.asks,
        };
        if size.is_positive() {
            book.insert(price, size);
        } else {
            book.remove(&price);
        }
    }

    /// Highest-priced bid level, if any.
    pub fn best_bid(&self) -> Option<TopLevel> {
        self.bids
            .iter()
            .next_back()
            .map(|(&price, &size)| TopLevel { price, size })
    }

    /// Lowest-priced ask level, if any.
    pub fn best_ask(&self) -> Option<TopLevel> {
        self.asks
            .iter()
            .next()
            .map(|(&price, &size)| TopLevel { price, size })
    }

    /// True when best bid >= best ask (both sides present).
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bb), Some(ba)) => bb.price >= ba.price,
            _ => false,
        }
    }

    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn px(v: rust_decimal::Decimal) -> Price {
        Price::new(v)
    }

    fn sz(v: rust_decimal::Decimal) -> Size {
        Size::new(v)
    }

    #[test]
    fn test_best_bid_is_max_best_ask_is_min() {
        let mut levels = BookLevels::new();
        levels.set_level(BookSide::Bid, px(dec!(0.48)), sz(dec!(10)));
        levels.set_level(BookSide::Bid, px(dec!(0.49)), sz(dec!(20)));
        levels.set_level(BookSide::Ask, px(dec!(0.52)), sz(dec!(30)));
        levels.set_level(BookSide::Ask, px(dec!(0.51)), sz(dec!(40)));

        assert_eq!(
            levels.best_bid(),
            Some(TopLevel {
                price: px(dec!(0.49)),
                size: sz(dec!(20))
            })
        );
        assert_eq!(
            levels.best_ask(),
            Some(TopLevel {
                price: px(dec!(0.51)),
                size: sz(dec!(40))
            })
        );
    }

    #[test]
    fn test_zero_size_deletes_level() {
        let mut levels = BookLevels::new();
        levels.set_level(BookSide::Bid, px(dec!(0.49)), sz(dec!(20)));
        levels.set_level(BookSide::Bid, px(dec!(0.49)), sz(dec!(0)));
        assert_eq!(levels.best_bid(), None);
        assert_eq!(levels.bid_depth(), 0);
    }

    #[test]
    fn test_snapshot_skips_empty_levels() {
        let mut levels = BookLevels::new();
        levels.replace_from_snapshot(
            &[(px(dec!(0.49)), sz(dec!(100))), (px(dec!(0.48)), sz(dec!(0)))],
            &[(px(dec!(0.51)), sz(dec!(100)))],
        );
        assert_eq!(levels.bid_depth(), 1);
        assert_eq!(levels.ask_depth(), 1);
    }

    #[test]
    fn test_crossed_detection() {
        let mut levels = BookLevels::new();
        levels.set_level(BookSide::Bid, px(dec!(0.51)), sz(dec!(10)));
        assert!(!levels.is_crossed());
        levels.set_level(BookSide::Ask, px(dec!(0.51)), sz(dec!(10)));
        assert!(levels.is_crossed());
        levels.set_level(BookSide::Ask, px(dec!(0.52)), sz(dec!(10)));
        levels.set_level(BookSide::Ask, px(dec!(0.51)), sz(dec!(0)));
        assert!(!levels.is_crossed());
    }
}
