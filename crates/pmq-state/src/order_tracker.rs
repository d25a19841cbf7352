//! Live-order tracker.

use std::collections::HashMap;

use tracing::trace;

use pmq_core::{LiveOrder, OrderId, UserEvent};

use crate::error::{StateError, StateResult};

/// Deterministic order tracker driven solely by user events.
///
/// Intentionally strict (fail loud on inconsistencies) so replay harnesses
/// catch protocol mismatches early.
#[derive(Debug, Default)]
pub struct OrderTracker {
    live: HashMap<OrderId, LiveOrder>,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one user event.
    ///
    /// `order_open` creates (duplicate id is an error); `fill` decrements
    /// remaining size but keeps the order live until an explicit close or
    /// cancel, because close is a distinct, authoritative venue signal;
    /// `order_canceled`/`order_closed` remove (unknown id is an error).
    pub fn apply(&mut self, event: &UserEvent) -> StateResult<()> {
        match event {
            UserEvent::OrderOpen {
                order_id,
                side,
                price,
                size,
            } => {
                if !size.is_positive() {
                    return Err(StateError::NonPositiveSize {
                        event: "order_open",
                        size: *size,
                    });
                }
                if self.live.contains_key(order_id) {
                    return Err(StateError::DuplicateOrderId(order_id.clone()));
                }
                trace!(%order_id, %side, %price, %size, "order open");
                self.live.insert(
                    order_id.clone(),
                    LiveOrder {
                        id: order_id.clone(),
                        side: *side,
                        price: *price,
                        remaining: *size,
                    },
                );
                Ok(())
            }
            UserEvent::Fill {
                order_id, size, ..
            } => {
                if !size.is_positive() {
                    return Err(StateError::NonPositiveSize {
                        event: "fill",
                        size: *size,
                    });
                }
                let order = self.live.get_mut(order_id).ok_or_else(|| {
                    StateError::UnknownOrderId {
                        event: "fill",
                        order_id: order_id.clone(),
                    }
                })?;
                if *size > order.remaining {
                    return Err(StateError::FillExceedsRemaining {
                        order_id: order_id.clone(),
                        fill: *size,
                        remaining: order.remaining,
                    });
                }
                order.remaining = order.remaining - *size;
                trace!(%order_id, remaining = %order.remaining, "fill applied");
                Ok(())
            }
            UserEvent::OrderCanceled { order_id } => self.remove(order_id, "order_canceled"),
            UserEvent::OrderClosed { order_id } => self.remove(order_id, "order_closed"),
        }
    }

    fn remove(&mut self, order_id: &OrderId, event: &'static str) -> StateResult<()> {
        match self.live.remove(order_id) {
            Some(_) => {
                trace!(%order_id, event, "order removed");
                Ok(())
            }
            None => Err(StateError::UnknownOrderId {
                event,
                order_id: order_id.clone(),
            }),
        }
    }

    /// Defensive, deterministically sorted copy of the live set
    /// (side, then price, then id).
    pub fn live_orders(&self) -> Vec<LiveOrder> {
        let mut out: Vec<LiveOrder> = self.live.values().cloned().collect();
        out.sort_by(LiveOrder::sort_key_cmp);
        out
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
