//! Sequenced order-book reconstruction for PMQ.
//!
//! Maintains per-price-level bid/ask size maps from a snapshot+delta feed and
//! makes feed gaps explicit instead of silently drifting: any sequence gap or
//! crossed book forces a resync that only a fresh snapshot can clear.

pub mod levels;
pub mod resync;

pub use levels::{BookLevels, TopLevel};
pub use resync::{BookMode, DeltaOutcome, ResyncBook, ResyncReason, SeqGap};
