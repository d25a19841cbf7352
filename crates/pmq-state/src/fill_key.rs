//! Composite fill identity for de-duplication.

use pmq_core::{OrderId, OrderSide, Price, Size};

/// Identity of one fill for at-most-once accounting: an adapter may replay
/// the same fill message, and replays must not double-count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FillKey {
    pub order_id: OrderId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
}
