//! Minimum-update-interval gate.
//!
//! Bounds how often the quoting decision is allowed to act at all; the token
//! bucket separately caps how many discrete actions a permitted cycle may
//! take.

use serde::{Deserialize, Serialize};

use crate::error::{ControlsError, ControlsResult};

/// Throttle parameters, as loaded from host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    pub min_interval_ms: u64,
}

/// Deterministic minimum-interval throttle under caller-supplied time.
#[derive(Debug)]
pub struct UpdateThrottle {
    min_interval_ms: u64,
    last_update_ms: Option<u64>,
}

impl UpdateThrottle {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_update_ms: None,
        }
    }

    /// Create a throttle from host configuration.
    pub fn from_config(cfg: &ThrottleConfig) -> Self {
        Self::new(cfg.min_interval_ms)
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// True if no update has happened yet or the minimum interval elapsed.
    pub fn can_update(&self, now_ms: u64) -> ControlsResult<bool> {
        match self.last_update_ms {
            None => Ok(true),
            Some(last) if now_ms < last => Err(ControlsError::NonMonotonicTime {
                now_ms,
                last_ms: last,
            }),
            Some(last) => Ok(now_ms - last >= self.min_interval_ms),
        }
    }

    /// Record that an update happened at `now_ms`.
    pub fn mark_updated(&mut self, now_ms: u64) -> ControlsResult<()> {
        if let Some(last) = self.last_update_ms {
            if now_ms < last {
                return Err(ControlsError::NonMonotonicTime {
                    now_ms,
                    last_ms: last,
                });
            }
        }
        self.last_update_ms = Some(now_ms);
        Ok(())
    }

    /// If allowed, mark updated and return true.
    pub fn allow(&mut self, now_ms: u64) -> ControlsResult<bool> {
        if !self.can_update(now_ms)? {
            return Ok(false);
        }
        self.mark_updated(now_ms)?;
        Ok(true)
    }
}
