//! Deterministic token bucket rate limiter.
//!
//! Bounds the absolute number of outbound order actions per unit time.
//! Refills in discrete 1-token increments every `refill_every_ms`; the caller
//! provides `now_ms`.

use serde::{Deserialize, Serialize};

use crate::error::{ControlsError, ControlsResult};

/// Bucket parameters, as loaded from host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    pub capacity: u32,
    pub refill_every_ms: u64,
}

/// Outcome of a `try_take` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeOutcome {
    pub ok: bool,
    pub remaining: u32,
}

/// Token bucket with discrete refill.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill_every_ms: u64,
    tokens: u32,
    last_refill_ms: Option<u64>,
}

impl TokenBucket {
    /// Create a bucket that starts full.
    pub fn new(capacity: u32, refill_every_ms: u64) -> Self {
        Self::with_start(capacity, refill_every_ms, true)
    }

    /// Create a full bucket from host configuration.
    pub fn from_config(cfg: &BucketConfig) -> Self {
        Self::new(cfg.capacity, cfg.refill_every_ms)
    }

    /// Create a bucket, optionally starting empty.
    pub fn with_start(capacity: u32, refill_every_ms: u64, start_full: bool) -> Self {
        // refill_every_ms == 0 would refill infinitely; treat as misconfig.
        debug_assert!(refill_every_ms > 0, "refill_every_ms must be > 0");
        Self {
            capacity,
            refill_every_ms,
            tokens: if start_full { capacity } else { 0 },
            last_refill_ms: None,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn refill_every_ms(&self) -> u64 {
        self.refill_every_ms
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    /// Take `n` tokens if available after refilling to `now_ms`.
    ///
    /// On rejection the token count is unchanged. `now_ms` must be
    /// non-decreasing across calls.
    pub fn try_take(&mut self, now_ms: u64, n: u32) -> ControlsResult<TakeOutcome> {
        self.refill(now_ms)?;
        if n == 0 {
            return Ok(TakeOutcome {
                ok: true,
                remaining: self.tokens,
            });
        }
        if self.tokens < n {
            return Ok(TakeOutcome {
                ok: false,
                remaining: self.tokens,
            });
        }
        self.tokens -= n;
        Ok(TakeOutcome {
            ok: true,
            remaining: self.tokens,
        })
    }

    fn refill(&mut self, now_ms: u64) -> ControlsResult<()> {
        let last = match self.last_refill_ms {
            None => {
                self.last_refill_ms = Some(now_ms);
                return Ok(());
            }
            Some(last) => last,
        };
        if now_ms < last {
            return Err(ControlsError::NonMonotonicTime {
                now_ms,
                last_ms: last,
            });
        }
        if self.tokens >= self.capacity {
            // Still advance last_refill_ms so a long idle doesn't mint a huge
            // burst later.
            self.last_refill_ms = Some(now_ms);
            return Ok(());
        }
        let add = (now_ms - last) / self.refill_every_ms;
        if add == 0 {
            return Ok(());
        }
        self.tokens = self.capacity.min(self.tokens.saturating_add(add.min(u64::from(u32::MAX)) as u32));
        // Advance by whole refill intervals, keeping the fractional remainder.
        self.last_refill_ms = Some(last + add * self.refill_every_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_refill_at_boundary() {
        let mut bucket = TokenBucket::new(2, 10);

        assert!(bucket.try_take(0, 1).unwrap().ok);
        assert!(bucket.try_take(0, 1).unwrap().ok);
        assert!(!bucket.try_take(0, 1).unwrap().ok);

        // One ms short of a refill interval: still denied.
        assert!(!bucket.try_take(9, 1).unwrap().ok);

        // Exactly one refill at the boundary.
        let out = bucket.try_take(10, 1).unwrap();
        assert!(out.ok);
        assert_eq!(out.remaining, 0);
    }

    #[test]
    fn test_refill_capped_at_capacity() {
        let mut bucket = TokenBucket::new(2, 10);
        assert!(bucket.try_take(0, 2).unwrap().ok);
        // 100ms elapsed = 10 potential tokens, capped at capacity 2.
        let out = bucket.try_take(100, 0).unwrap();
        assert_eq!(out.remaining, 2);
    }

    #[test]
    fn test_idle_at_capacity_does_not_bank_burst() {
        let mut bucket = TokenBucket::new(2, 10);
        bucket.try_take(0, 0).unwrap();
        // Long idle while full: last_refill_ms advances, no banked credit.
        bucket.try_take(1_000, 0).unwrap();
        assert!(bucket.try_take(1_000, 2).unwrap().ok);
        // Immediately after draining there is no refill owed from the idle span.
        assert!(!bucket.try_take(1_005, 1).unwrap().ok);
        assert!(bucket.try_take(1_010, 1).unwrap().ok);
    }

    #[test]
    fn test_fractional_interval_preserved() {
        let mut bucket = TokenBucket::new(5, 10);
        bucket.try_take(0, 5).unwrap();
        // 15ms = one whole interval, 5ms remainder kept.
        assert_eq!(bucket.try_take(15, 0).unwrap().remaining, 1);
        // 5ms later the remainder completes a second interval.
        assert_eq!(bucket.try_take(20, 0).unwrap().remaining, 2);
    }

    #[test]
    fn test_rejection_leaves_tokens_unchanged() {
        let mut bucket = TokenBucket::new(3, 10);
        bucket.try_take(0, 2).unwrap();
        let out = bucket.try_take(0, 2).unwrap();
        assert!(!out.ok);
        assert_eq!(out.remaining, 1);
        assert!(bucket.try_take(0, 1).unwrap().ok);
    }

    #[test]
    fn test_take_zero_always_ok() {
        let mut bucket = TokenBucket::with_start(2, 10, false);
        let out = bucket.try_take(0, 0).unwrap();
        assert!(out.ok);
        assert_eq!(out.remaining, 0);
    }

    #[test]
    fn test_non_monotonic_time_is_error() {
        let mut bucket = TokenBucket::new(2, 10);
        bucket.try_take(100, 1).unwrap();
        let err = bucket.try_take(50, 1).unwrap_err();
        assert_eq!(
            err,
            ControlsError::NonMonotonicTime {
                now_ms: 50,
                last_ms: 100
            }
        );
    }

    #[test]
    fn test_start_empty() {
        let mut bucket = TokenBucket::with_start(3, 10, false);
        assert!(!bucket.try_take(0, 1).unwrap().ok);
        assert!(bucket.try_take(10, 1).unwrap().ok);
    }
}
