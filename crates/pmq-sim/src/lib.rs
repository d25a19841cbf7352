//! Deterministic exchange simulator.
//!
//! Not a matching engine. It exists to generate market snapshots
//! deterministically, accept and cancel orders, and create fills when the
//! simulated external mid moves across resting orders: enough to drive the
//! engine end to end in replay runs and tests.

pub mod exchange;
pub mod rng;

pub use exchange::{SimConfig, SimExchange, SimExecutor, SimFeed, SimHandle};
pub use rng::Mulberry32;
