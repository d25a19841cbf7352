//! Event-sourced order and position state.
//!
//! Two strict state machines driven solely by normalized user events:
//! - `OrderTracker` reconstructs the set of live orders
//! - `PositionTracker` accumulates signed inventory from fills
//!
//! plus `EconomicsLedger`, which extends position tracking with signed cash
//! flow and a bounded fill history.
//!
//! Inconsistencies (duplicate ids, unknown ids, over-fills) are contract
//! breaches between the engine and its event sources; they fail loudly as
//! `StateError` instead of being absorbed.

pub mod error;
mod fill_key;
pub mod ledger;
pub mod order_tracker;
pub mod position;

pub use error::{StateError, StateResult};
pub use ledger::{EconomicsLedger, FillRecord, LedgerSnapshot};
pub use order_tracker::OrderTracker;
pub use position::{PositionSnapshot, PositionTracker};
