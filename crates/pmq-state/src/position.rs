//! Fill-driven position tracker.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::trace;

use pmq_core::{OrderSide, UserEvent};

use crate::error::{StateError, StateResult};
use crate::fill_key::FillKey;

/// Signed inventory accumulated from fill events only.
///
/// Identical fills (same order id, side, price, size) are de-duplicated to
/// tolerate at-most-once-intended but possibly-replayed delivery; replays are
/// counted for observability.
#[derive(Debug, Default)]
pub struct PositionTracker {
    position: Decimal,
    fill_count: u64,
    duplicate_fill_count: u64,
    seen: HashSet<FillKey>,
}

/// Serializable snapshot of tracker counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSnapshot {
    pub position: Decimal,
    pub fill_count: u64,
    pub duplicate_fill_count: u64,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
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
            trace!(%order_id, "duplicate fill ignored");
            return Ok(());
        }
        self.fill_count += 1;

        match side {
            OrderSide::Buy => self.position += size.inner(),
            OrderSide::Sell => self.position -= size.inner(),
        }
        Ok(())
    }

    /// Signed inventory; positive = net long.
    pub fn position(&self) -> Decimal {
        self.position
    }

    pub fn fill_count(&self) -> u64 {
        self.fill_count
    }

    pub fn duplicate_fill_count(&self) -> u64 {
        self.duplicate_fill_count
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            position: self.position,
            fill_count: self.fill_count,
            duplicate_fill_count: self.duplicate_fill_count,
        }
    }
}
