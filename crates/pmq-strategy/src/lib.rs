//! Quoting strategy for PMQ.
//!
//! Two pure functions:
//! - `compute_desired_quotes`: (top of book, inventory) -> two desired orders
//!   on the tick grid with inventory skew and spread bounds
//! - `diff_orders`: desired vs. live -> bounded cancels and placements

pub mod diff;
pub mod error;
pub mod quote;

pub use diff::{diff_orders, DiffConfig, OrderDiff};
pub use error::{StrategyError, StrategyResult};
pub use quote::{compute_desired_quotes, DesiredQuotes, QuoteConfig};
