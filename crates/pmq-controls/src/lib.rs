//! Rate controls and kill-switch evaluation.
//!
//! All components here are deterministic: no timers, no wall clock. Callers
//! supply time in milliseconds, which must be non-decreasing per instance.

pub mod error;
pub mod kill_switch;
pub mod throttle;
pub mod token_bucket;

pub use error::{ControlsError, ControlsResult};
pub use kill_switch::{decide, DataAges, KillDecision, KillReason, KillSwitchConfig};
pub use throttle::{ThrottleConfig, UpdateThrottle};
pub use token_bucket::{BucketConfig, TakeOutcome, TokenBucket};
