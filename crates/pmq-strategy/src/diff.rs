//! Desired-vs-live order reconciliation.
//!
//! Simplifying policy: at most one live order per side is considered
//! canonical. Output lists are truncated to the per-cycle caps; partial
//! convergence is acceptable and safer than an unbounded burst, and the next
//! cycle re-proposes whatever was dropped.

use serde::{Deserialize, Serialize};

use pmq_core::{DesiredOrder, LiveOrder, OrderId, OrderSide, Price, Size};

/// Reconciliation tolerances and churn caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Max price distance for a live order to count as matching.
    pub price_tolerance: Price,
    /// Max size distance for a live order to count as matching.
    pub size_tolerance: Size,
    pub max_cancels_per_cycle: usize,
    pub max_places_per_cycle: usize,
}

/// Changes to converge live -> desired.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderDiff {
    pub cancel: Vec<OrderId>,
    pub place: Vec<DesiredOrder>,
}

impl OrderDiff {
    pub fn is_empty(&self) -> bool {
        self.cancel.is_empty() && self.place.is_empty()
    }
}

/// Decide minimal changes per side, limiting churn.
pub fn diff_orders(desired: &[DesiredOrder], live: &[LiveOrder], cfg: &DiffConfig) -> OrderDiff {
    let mut diff = OrderDiff::default();

    for side in [OrderSide::Buy, OrderSide::Sell] {
        let want = desired.iter().find(|o| o.side == side);
        let live_for_side: Vec<&LiveOrder> = live.iter().filter(|o| o.side == side).collect();

        let keep = want.and_then(|d| {
            live_for_side.iter().find(|o| {
                let price_ok =
                    (o.price.inner() - d.price.inner()).abs() <= cfg.price_tolerance.inner();
                let size_ok =
                    (o.remaining.inner() - d.size.inner()).abs() <= cfg.size_tolerance.inner();
                price_ok && size_ok
            })
        });

        for o in &live_for_side {
            if let Some(kept) = keep {
                if o.id == kept.id {
                    continue;
                }
            }
            diff.cancel.push(o.id.clone());
        }

        if let (Some(d), None) = (want, keep) {
            diff.place.push(d.clone());
        }
    }

    diff.cancel.truncate(cfg.max_cancels_per_cycle);
    diff.place.truncate(cfg.max_places_per_cycle);
    diff
}
