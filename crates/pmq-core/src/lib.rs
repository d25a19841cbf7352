//! Core domain types for the PMQ market-making engine.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Price`, `Size`: precision-safe numeric types on the (0, 1) outcome grid
//! - `OrderSide`, `BookSide`: trading enums
//! - `MarketEvent`, `UserEvent`: normalized feed events
//! - `DesiredOrder`, `LiveOrder`: quoting and tracking shapes
//! - `ExecutionClient`: the injected execution boundary

pub mod decimal;
pub mod error;
pub mod events;
pub mod execution;
pub mod ids;
pub mod order;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use events::{BookLevel, FixtureFeed, MarketEvent, UserEvent};
pub use ids::IdGenerator;
pub use order::{BookSide, DesiredOrder, LiveOrder, MarketId, OrderId, OrderSide};

// Execution boundary
pub use execution::{
    CancelAllOutcome, CancelOutcome, ExecutionClient, PlaceOrderRequest, PlaceOutcome,
};
