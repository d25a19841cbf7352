//! Economics ledger: cash + position + bounded fill history.

use std::collections::{HashSet, VecDeque};

use rust_decimal::Decimal;
use serde::Serialize;

use pmq_core::{OrderSide, Price, UserEvent};

use crate::error::{StateError, StateResult};
use crate::fill_key::FillKey;

const DEFAULT_MAX_FILLS: usize = 50;

/// One retained fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillRecord {
    pub order_id: String,
    pub side: OrderSide,
    pub price: Price,
    pub size: pmq_core::Size,
}

/// Deterministic economics ledger driven solely by fill events.
///
/// Tracks signed quote-currency cash flow (BUY spends, SELL earns), signed
/// position, and the last `max_fills` fills. Memory is bounded by the fill
/// ring; the de-dup key set grows with unique fills like the position
/// tracker's.
#[derive(Debug)]
pub struct EconomicsLedger {
    max_fills: usize,
    cash: Decimal,
    position: Decimal,
    fill_count: u64,
    duplicate_fill_count: u64,
    seen: HashSet<FillKey>,
    recent_fills: VecDeque<FillRecord>,
}

/// Serializable summary of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub cash: Decimal,
    pub position: Decimal,
    pub fill_count: u64,
    pub duplicate_fill_count: u64,
    pub recent_fills: Vec<FillRecord>,
}

impl Default for EconomicsLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILLS)
    }
}

impl EconomicsLedger {
    pub fn new(max_fills: usize) -> Self {
        Self {
            max_fills,
            cash: Decimal::ZERO,
            position: Decimal::ZERO,
            fill_count: 0,
            duplicate_fill_count: 0,
            seen: HashSet::new(),
            recent_fills: VecDeque::with_capacity(max_fills.min(64)),
        }
    }

    /// Apply one user event; everything except `fill` is ignored.
    pub fn apply(&mut self, event: &UserEvent) -> StateResult<()> {
        let UserEvent::Fill {
            order_id,
            side,
            price,
            size,
        } = event
        else {
            return Ok(());
        };
        if !size.is_positive() {
            return Err(StateError::NonPositiveSize {
                event: "fill",
                size: *size,
            });
        }

        let key = FillKey {
            order_id: order_id.clone(),
            side: *side,
            price: *price,
            size: *size,
        };
        if !self.seen.insert(key) {
            self.duplicate_fill_count += 1;
            return Ok(());
        }
        self.fill_count += 1;

        let notional = size.notional(*price);
        match side {
            OrderSide::Buy => {
                self.position += size.inner();
                self.cash -= notional;
            }
            OrderSide::Sell => {
                self.position -= size.inner();
                self.cash += notional;
            }
        }

        if self.max_fills > 0 {
            if self.recent_fills.len() == self.max_fills {
                self.recent_fills.pop_front();
            }
            self.recent_fills.push_back(FillRecord {
                order_id: order_id.to_string(),
                side: *side,
                price: *price,
                size: *size,
            });
        }
        Ok(())
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn position(&self) -> Decimal {
        self.position
    }

    pub fn fill_count(&self) -> u64 {
        self.fill_count
    }

    pub fn duplicate_fill_count(&self) -> u64 {
        self.duplicate_fill_count
    }

    /// Mark-to-reference P&L: `cash + position * reference`.
    pub fn pnl_marked_at(&self, reference: Price) -> Decimal {
        self.cash + self.position * reference.inner()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cash: self.cash,
            position: self.position,
            fill_count: self.fill_count,
            duplicate_fill_count: self.duplicate_fill_count,
            recent_fills: self.recent_fills.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmq_core::{OrderId, Size};
    use rust_decimal_macros::dec;

    fn fill(id: &str, side: OrderSide, price: rust_decimal::Decimal, size: rust_decimal::Decimal) -> UserEvent {
        UserEvent::Fill {
            order_id: OrderId::from(id),
            side,
            price: Price::new(price),
            size: Size::new(size),
        }
    }

    #[test]
    fn test_buy_debits_sell_credits() {
        let mut ledger = EconomicsLedger::default();
        ledger.apply(&fill("o1", OrderSide::Buy, dec!(0.49), dec!(10))).unwrap();
        assert_eq!(ledger.cash(), dec!(-4.90));
        assert_eq!(ledger.position(), dec!(10));

        ledger.apply(&fill("o2", OrderSide::Sell, dec!(0.53), dec!(10))).unwrap();
        assert_eq!(ledger.cash(), dec!(0.40));
        assert_eq!(ledger.position(), dec!(0));
    }

    #[test]
    fn test_pnl_marked_at_reference() {
        let mut ledger = EconomicsLedger::default();
        ledger.apply(&fill("o1", OrderSide::Buy, dec!(0.49), dec!(10))).unwrap();
        // Bought 10 at 0.49; marked at 0.51 that's +0.02 * 10.
        assert_eq!(ledger.pnl_marked_at(Price::new(dec!(0.51))), dec!(0.20));
    }

    #[test]
    fn test_duplicate_fill_ignored() {
        let mut ledger = EconomicsLedger::default();
        let ev = fill("o1", OrderSide::Buy, dec!(0.49), dec!(10));
        ledger.apply(&ev).unwrap();
        ledger.apply(&ev).unwrap();
        assert_eq!(ledger.cash(), dec!(-4.90));
        assert_eq!(ledger.fill_count(), 1);
        assert_eq!(ledger.duplicate_fill_count(), 1);
    }

    #[test]
    fn test_fill_ring_is_bounded() {
        let mut ledger = EconomicsLedger::new(2);
        ledger.apply(&fill("o1", OrderSide::Buy, dec!(0.49), dec!(1))).unwrap();
        ledger.apply(&fill("o2", OrderSide::Buy, dec!(0.49), dec!(2))).unwrap();
        ledger.apply(&fill("o3", OrderSide::Buy, dec!(0.49), dec!(3))).unwrap();

        let snap = ledger.snapshot();
        assert_eq!(snap.recent_fills.len(), 2);
        assert_eq!(snap.recent_fills[0].order_id, "o2");
        assert_eq!(snap.recent_fills[1].order_id, "o3");
        // Totals still reflect all three fills.
        assert_eq!(snap.position, dec!(6));
    }

    #[test]
    fn test_zero_ring_keeps_no_history() {
        let mut ledger = EconomicsLedger::new(0);
        ledger.apply(&fill("o1", OrderSide::Buy, dec!(0.49), dec!(1))).unwrap();
        assert!(ledger.snapshot().recent_fills.is_empty());
        assert_eq!(ledger.fill_count(), 1);
    }
}
