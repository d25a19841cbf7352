//! Rewards-scoring interface.
//!
//! Scoring is observability only: the result feeds summaries and traces and
//! never gates a trading decision.

use serde::{Deserialize, Serialize};
use std::fmt;

use pmq_book::TopLevel;
use pmq_core::{OrderSide, Price, Size};

/// Inputs for checking one resting order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringContext {
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
    pub best_bid: Option<TopLevel>,
    pub best_ask: Option<TopLevel>,
}

/// Why an order does (not) score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReason {
    Ok,
    NoBook,
    SizeTooSmall,
    NotTopOfBook,
    /// No live order on the side at all.
    NoOrder,
}

impl fmt::Display for ScoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::NoBook => write!(f, "no_book"),
            Self::SizeTooSmall => write!(f, "size_too_small"),
            Self::NotTopOfBook => write!(f, "not_top_of_book"),
            Self::NoOrder => write!(f, "no_order"),
        }
    }
}

/// Scoring verdict for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoringResult {
    pub scoring: bool,
    pub reason: ScoreReason,
}

/// Injected scoring verifier.
pub trait ScoringChecker {
    fn check_order(&self, ctx: &ScoringContext) -> ScoringResult;
}

/// Configuration for the deterministic rewards checker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub min_size: Size,
    pub require_top_of_book: bool,
}

/// Deterministic scoring verifier.
///
/// Rules: requires a two-sided book; requires order size >= `min_size`; and,
/// when `require_top_of_book`, a BUY must rest at the best bid and a SELL at
/// the best ask. A live venue implementation can replace this.
#[derive(Debug, Clone)]
pub struct RewardsScoringChecker {
    cfg: ScoringConfig,
}

impl RewardsScoringChecker {
    pub fn new(cfg: ScoringConfig) -> Self {
        Self { cfg }
    }
}

impl ScoringChecker for RewardsScoringChecker {
    fn check_order(&self, ctx: &ScoringContext) -> ScoringResult {
        let (Some(bb), Some(ba)) = (ctx.best_bid, ctx.best_ask) else {
            return ScoringResult {
                scoring: false,
                reason: ScoreReason::NoBook,
            };
        };
        if ctx.size < self.cfg.min_size {
            return ScoringResult {
                scoring: false,
                reason: ScoreReason::SizeTooSmall,
            };
        }
        if self.cfg.require_top_of_book {
            let at_top = match ctx.side {
                OrderSide::Buy => ctx.price == bb.price,
                OrderSide::Sell => ctx.price == ba.price,
            };
            if !at_top {
                return ScoringResult {
                    scoring: false,
                    reason: ScoreReason::NotTopOfBook,
                };
            }
        }
        ScoringResult {
            scoring: true,
            reason: ScoreReason::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn checker() -> RewardsScoringChecker {
        RewardsScoringChecker::new(ScoringConfig {
            min_size: Size::new(dec!(1)),
            require_top_of_book: true,
        })
    }

    fn ctx(side: OrderSide, price: rust_decimal::Decimal, size: rust_decimal::Decimal) -> ScoringContext {
        ScoringContext {
            side,
            price: Price::new(price),
            size: Size::new(size),
            best_bid: Some(TopLevel {
                price: Price::new(dec!(0.50)),
                size: Size::new(dec!(100)),
            }),
            best_ask: Some(TopLevel {
                price: Price::new(dec!(0.52)),
                size: Size::new(dec!(100)),
            }),
        }
    }

    #[test]
    fn test_scores_at_top_of_book() {
        let r = checker().check_order(&ctx(OrderSide::Buy, dec!(0.50), dec!(5)));
        assert!(r.scoring);
        assert_eq!(r.reason, ScoreReason::Ok);
    }

    #[test]
    fn test_no_book_never_scores() {
        let mut c = ctx(OrderSide::Buy, dec!(0.50), dec!(5));
        c.best_ask = None;
        let r = checker().check_order(&c);
        assert!(!r.scoring);
        assert_eq!(r.reason, ScoreReason::NoBook);
    }

    #[test]
    fn test_size_below_min_rejected() {
        let r = checker().check_order(&ctx(OrderSide::Buy, dec!(0.50), dec!(0.5)));
        assert_eq!(r.reason, ScoreReason::SizeTooSmall);
    }

    #[test]
    fn test_away_from_top_rejected() {
        let r = checker().check_order(&ctx(OrderSide::Buy, dec!(0.49), dec!(5)));
        assert_eq!(r.reason, ScoreReason::NotTopOfBook);

        let r = checker().check_order(&ctx(OrderSide::Sell, dec!(0.53), dec!(5)));
        assert_eq!(r.reason, ScoreReason::NotTopOfBook);
    }

    #[test]
    fn test_top_of_book_not_required() {
        let lenient = RewardsScoringChecker::new(ScoringConfig {
            min_size: Size::new(dec!(1)),
            require_top_of_book: false,
        });
        let r = lenient.check_order(&ctx(OrderSide::Buy, dec!(0.45), dec!(5)));
        assert!(r.scoring);
    }
}
