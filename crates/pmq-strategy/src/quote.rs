//! Pure quoting function: top of book + inventory -> two desired orders.
//!
//! All pricing happens on integer tick counts derived once per call, so
//! repeated cycles cannot accumulate rounding drift. Positive inventory
//! shifts both quotes down (more eager to sell, less eager to buy).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use pmq_book::TopLevel;
use pmq_core::{DesiredOrder, OrderSide, Price, Size};

use crate::error::{StrategyError, StrategyResult};

/// Quoting parameters. All price-unit fields live on the same (0, 1) grid as
/// the quotes themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Price grid increment; must evenly divide 1.0.
    pub tick_size: Price,
    /// Desired half-spread around the midpoint.
    pub half_spread: Price,
    /// Maximum total spread allowed.
    pub max_spread: Price,
    /// Minimum order size required by venue policy.
    pub min_size: Size,
    /// Target order size to post.
    pub order_size: Size,
    /// Position size at which skew saturates.
    pub inventory_target: Decimal,
    /// Maximum price shift applied to both quotes.
    pub max_skew: Price,
}

impl QuoteConfig {
    /// Check every precondition the quote computer relies on.
    pub fn validate(&self) -> StrategyResult<()> {
        if !self.tick_size.is_positive() {
            return Err(StrategyError::InvalidConfig("tick_size must be > 0".into()));
        }
        if !self.half_spread.is_positive() {
            return Err(StrategyError::InvalidConfig("half_spread must be > 0".into()));
        }
        if !self.max_spread.is_positive() {
            return Err(StrategyError::InvalidConfig("max_spread must be > 0".into()));
        }
        if self.order_size < self.min_size {
            return Err(StrategyError::InvalidConfig(
                "order_size must be >= min_size".into(),
            ));
        }
        if self.inventory_target <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "inventory_target must be > 0".into(),
            ));
        }
        if self.max_skew.inner() < Decimal::ZERO {
            return Err(StrategyError::InvalidConfig("max_skew must be >= 0".into()));
        }
        if !(Decimal::ONE % self.tick_size.inner()).is_zero() {
            return Err(StrategyError::InvalidConfig(
                "tick_size must evenly divide 1.0".into(),
            ));
        }
        if self.one_ticks() < 2 {
            return Err(StrategyError::InvalidConfig(
                "tick_size too large for the (0,1) price domain".into(),
            ));
        }
        if self.max_spread < self.tick_size {
            return Err(StrategyError::InvalidConfig(
                "max_spread too small for tick_size".into(),
            ));
        }
        Ok(())
    }

    /// Number of ticks in 1.0. Exact once `validate` has passed.
    fn one_ticks(&self) -> i64 {
        (Decimal::ONE / self.tick_size.inner())
            .to_i64()
            .unwrap_or(0)
    }
}

/// The two desired quotes, one per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredQuotes {
    pub buy: DesiredOrder,
    pub sell: DesiredOrder,
}

impl DesiredQuotes {
    pub fn to_vec(&self) -> Vec<DesiredOrder> {
        vec![self.buy.clone(), self.sell.clone()]
    }
}

/// Round to the nearest integer, midpoint away from zero.
fn round_ticks(d: Decimal) -> i64 {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Compute the desired two-sided quotes.
///
/// The config must have passed `validate`, and the book must not be crossed.
pub fn compute_desired_quotes(
    best_bid: TopLevel,
    best_ask: TopLevel,
    inventory: Decimal,
    cfg: &QuoteConfig,
) -> StrategyResult<DesiredQuotes> {
    if best_bid.price >= best_ask.price {
        return Err(StrategyError::CrossedBook {
            bid: best_bid.price,
            ask: best_ask.price,
        });
    }

    let tick = cfg.tick_size.inner();
    let mid = Price::midpoint(best_bid.price, best_ask.price).inner();
    let half = cfg
        .half_spread
        .inner()
        .min(cfg.max_spread.inner() / Decimal::TWO);

    let inv_norm = (inventory / cfg.inventory_target)
        .max(Decimal::NEGATIVE_ONE)
        .min(Decimal::ONE);
    let skew = inv_norm * cfg.max_skew.inner();
    let center = mid - skew;

    // Work on the tick grid directly so max_spread holds after rounding.
    let max_ticks = (cfg.max_spread.inner() / tick)
        .floor()
        .to_i64()
        .unwrap_or(0);
    if max_ticks < 1 {
        return Err(StrategyError::SpreadUnrepresentable);
    }

    let desired_total = cfg.max_spread.inner().min(Decimal::TWO * half);
    let desired_ticks = round_ticks(desired_total / tick).max(1);
    let mut spread_ticks = max_ticks.min(desired_ticks);

    // Clamp to the open (0, 1) domain: ticks 1 ..= one_ticks - 1. Quoting at
    // exactly 0 or 1 is never meaningful for a binary outcome.
    let one_ticks = cfg.one_ticks();
    let min_tick: i64 = 1;
    let max_tick: i64 = one_ticks - 1;
    spread_ticks = spread_ticks.min(max_tick - min_tick);
    if spread_ticks < 1 {
        return Err(StrategyError::SpreadUnrepresentable);
    }

    let center_ticks = center / tick;
    let bid_tick0 = round_ticks(center_ticks - Decimal::from(spread_ticks) / Decimal::TWO);
    let bid_tick = bid_tick0.clamp(min_tick, max_tick - spread_ticks);
    let ask_tick = bid_tick + spread_ticks;

    let bid = Price::new(Decimal::from(bid_tick) * tick);
    let ask = Price::new(Decimal::from(ask_tick) * tick);

    if ask <= bid {
        return Err(StrategyError::Postcondition(format!(
            "non-positive spread: bid {bid}, ask {ask}"
        )));
    }
    if ask.inner() - bid.inner() > cfg.max_spread.inner() {
        return Err(StrategyError::Postcondition(format!(
            "spread exceeds max_spread: bid {bid}, ask {ask}"
        )));
    }
    if !bid.in_open_unit_interval() || !ask.in_open_unit_interval() {
        return Err(StrategyError::Postcondition(format!(
            "quote outside (0,1): bid {bid}, ask {ask}"
        )));
    }

    Ok(DesiredQuotes {
        buy: DesiredOrder {
            side: OrderSide::Buy,
            price: bid,
            size: cfg.order_size,
        },
        sell: DesiredOrder {
            side: OrderSide::Sell,
            price: ask,
            size: cfg.order_size,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cfg() -> QuoteConfig {
        QuoteConfig {
            tick_size: Price::new(dec!(0.01)),
            half_spread: Price::new(dec!(0.02)),
            max_spread: Price::new(dec!(0.10)),
            min_size: Size::new(dec!(1)),
            order_size: Size::new(dec!(1)),
            inventory_target: dec!(10),
            max_skew: Price::new(dec!(0.02)),
        }
    }

    fn top(p: rust_decimal::Decimal) -> TopLevel {
        TopLevel {
            price: Price::new(p),
            size: Size::new(dec!(100)),
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        cfg().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_tick() {
        let mut c = cfg();
        c.tick_size = Price::new(dec!(0.03));
        assert!(matches!(
            c.validate().unwrap_err(),
            StrategyError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_validate_rejects_order_below_min() {
        let mut c = cfg();
        c.order_size = Size::new(dec!(0.5));
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_symmetric_quotes_flat_inventory() {
        let q = compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(0), &cfg()).unwrap();
        // mid 0.51, total spread min(0.10, 2*0.02) = 0.04 -> 4 ticks
        assert_eq!(q.buy.price, Price::new(dec!(0.49)));
        assert_eq!(q.sell.price, Price::new(dec!(0.53)));
        assert_eq!(q.buy.size, Size::new(dec!(1)));
    }

    #[test]
    fn test_midpoint_off_grid_rounds_up() {
        let q = compute_desired_quotes(top(dec!(0.51)), top(dec!(0.52)), dec!(0), &cfg()).unwrap();
        // mid 0.515, center ticks 51.5, bid tick round(49.5) = 50
        assert_eq!(q.buy.price, Price::new(dec!(0.50)));
        assert_eq!(q.sell.price, Price::new(dec!(0.54)));
    }

    #[test]
    fn test_long_inventory_shifts_quotes_down() {
        let flat = compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(0), &cfg()).unwrap();
        let long = compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(10), &cfg()).unwrap();
        // Saturated long skew = 0.02 = 2 ticks down on both quotes.
        assert_eq!(long.buy.price, Price::new(dec!(0.47)));
        assert_eq!(long.sell.price, Price::new(dec!(0.51)));
        assert!(long.buy.price < flat.buy.price);
        assert!(long.sell.price < flat.sell.price);
    }

    #[test]
    fn test_short_inventory_shifts_quotes_up() {
        let short = compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(-10), &cfg()).unwrap();
        assert_eq!(short.buy.price, Price::new(dec!(0.51)));
        assert_eq!(short.sell.price, Price::new(dec!(0.55)));
    }

    #[test]
    fn test_inventory_skew_saturates_at_target() {
        let at_target =
            compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(10), &cfg()).unwrap();
        let beyond =
            compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(100), &cfg()).unwrap();
        assert_eq!(at_target, beyond);
    }

    #[test]
    fn test_spread_capped_by_max_spread() {
        let mut c = cfg();
        c.half_spread = Price::new(dec!(0.30));
        let q = compute_desired_quotes(top(dec!(0.50)), top(dec!(0.52)), dec!(0), &c).unwrap();
        let spread = q.sell.price.inner() - q.buy.price.inner();
        assert!(spread <= c.max_spread.inner());
        assert_eq!(spread, dec!(0.10));
    }

    #[test]
    fn test_quotes_clamped_inside_unit_interval() {
        // Midpoint hugging zero forces the bid clamp to tick 1.
        let q = compute_desired_quotes(top(dec!(0.01)), top(dec!(0.02)), dec!(10), &cfg()).unwrap();
        assert!(q.buy.price.in_open_unit_interval());
        assert!(q.sell.price.in_open_unit_interval());
        assert_eq!(q.buy.price, Price::new(dec!(0.01)));

        // And hugging one clamps the ask to one_ticks - 1.
        let q = compute_desired_quotes(top(dec!(0.98)), top(dec!(0.99)), dec!(-10), &cfg()).unwrap();
        assert!(q.sell.price.in_open_unit_interval());
        assert_eq!(q.sell.price, Price::new(dec!(0.99)));
    }

    #[test]
    fn test_crossed_book_is_error() {
        let err = compute_desired_quotes(top(dec!(0.52)), top(dec!(0.52)), dec!(0), &cfg()).unwrap_err();
        assert!(matches!(err, StrategyError::CrossedBook { .. }));
    }

    #[test]
    fn test_postconditions_across_books_and_inventories() {
        let c = cfg();
        let books = [
            (dec!(0.10), dec!(0.12)),
            (dec!(0.49), dec!(0.51)),
            (dec!(0.50), dec!(0.56)),
            (dec!(0.90), dec!(0.95)),
            (dec!(0.02), dec!(0.03)),
        ];
        let inventories = [dec!(-25), dec!(-10), dec!(-3), dec!(0), dec!(3), dec!(10), dec!(25)];
        for (bb, ba) in books {
            for inv in inventories {
                let q = compute_desired_quotes(top(bb), top(ba), inv, &c).unwrap();
                assert!(q.buy.price.is_on_tick(c.tick_size));
                assert!(q.sell.price.is_on_tick(c.tick_size));
                assert!(q.sell.price > q.buy.price);
                assert!(q.sell.price.inner() - q.buy.price.inner() <= c.max_spread.inner());
                assert!(q.buy.price.in_open_unit_interval());
                assert!(q.sell.price.in_open_unit_interval());
                assert!(q.buy.size >= c.min_size);
                assert!(q.sell.size >= c.min_size);
            }
        }
    }
}
