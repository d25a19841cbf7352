//! The injected execution boundary.
//!
//! The engine never talks to the venue directly: it reacts to `ok`/`reason`
//! outcomes from an `ExecutionClient` supplied by the host. Policy checks,
//! allowlists, and geofencing belong to the implementation behind this trait.

use serde::{Deserialize, Serialize};

use crate::order::{MarketId, OrderId, OrderSide};
use crate::{Price, Size};

/// Request to rest a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub market: MarketId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
}

/// Outcome of a place attempt. Rejections are business conditions, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOutcome {
    pub ok: bool,
    pub reason: Option<String>,
    pub order_id: Option<OrderId>,
}

impl PlaceOutcome {
    pub fn accepted(order_id: OrderId) -> Self {
        Self {
            ok: true,
            reason: None,
            order_id: Some(order_id),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
            order_id: None,
        }
    }
}

/// Outcome of a cancel attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub ok: bool,
    pub reason: Option<String>,
}

impl CancelOutcome {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of a cancel-all sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelAllOutcome {
    pub ok: bool,
    pub reason: Option<String>,
    pub canceled: u32,
}

/// Blocking round-trip order actions from the engine's perspective.
///
/// A host must serialize cycles per market; implementations may assume calls
/// for one market never overlap.
pub trait ExecutionClient {
    fn place_order(&mut self, req: &PlaceOrderRequest) -> PlaceOutcome;
    fn cancel_order(&mut self, id: &OrderId) -> CancelOutcome;
    fn cancel_all(&mut self) -> CancelAllOutcome;
}
