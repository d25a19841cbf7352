//! Kill-switch evaluation.
//!
//! A pure function of data-staleness timestamps. The control loop overrides
//! the decision with order-book integrity reasons, which always take
//! precedence over staleness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Staleness thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillSwitchConfig {
    pub stale_market_data_ms: u64,
    pub stale_user_data_ms: u64,
}

/// Observed data ages at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataAges {
    pub now_ms: u64,
    pub last_market_data_ms: Option<u64>,
    pub last_user_data_ms: Option<u64>,
}

/// Why all resting orders must be pulled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillReason {
    NoMarketDataYet,
    StaleMarketData,
    StaleUserData,
    /// Loop-level override: book resyncing after a sequence gap.
    OrderbookResyncGap,
    /// Loop-level override: book crossed (in any flavor).
    OrderbookCrossed,
}

impl KillReason {
    /// The transient startup reason: no market data observed yet. Some call
    /// sites deliberately do not latch on it.
    pub fn is_startup(&self) -> bool {
        matches!(self, Self::NoMarketDataYet)
    }
}

impl fmt::Display for KillReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMarketDataYet => write!(f, "no_market_data_yet"),
            Self::StaleMarketData => write!(f, "stale_market_data"),
            Self::StaleUserData => write!(f, "stale_user_data"),
            Self::OrderbookResyncGap => write!(f, "orderbook_resync_gap"),
            Self::OrderbookCrossed => write!(f, "orderbook_crossed"),
        }
    }
}

/// Decision: cancel everything, or keep quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillDecision {
    pub cancel_all: bool,
    pub reason: Option<KillReason>,
}

impl KillDecision {
    pub fn cancel(reason: KillReason) -> Self {
        Self {
            cancel_all: true,
            reason: Some(reason),
        }
    }

    pub fn keep_quoting() -> Self {
        Self {
            cancel_all: false,
            reason: None,
        }
    }
}

/// Evaluate the staleness rules, in priority order:
/// no market data yet → cancel; market data stale → cancel; no user data yet →
/// keep quoting (still pre-trade-safe); user data stale → cancel.
pub fn decide(ages: DataAges, cfg: &KillSwitchConfig) -> KillDecision {
    let last_market = match ages.last_market_data_ms {
        None => return KillDecision::cancel(KillReason::NoMarketDataYet),
        Some(t) => t,
    };
    if ages.now_ms.saturating_sub(last_market) > cfg.stale_market_data_ms {
        return KillDecision::cancel(KillReason::StaleMarketData);
    }

    let last_user = match ages.last_user_data_ms {
        None => return KillDecision::keep_quoting(),
        Some(t) => t,
    };
    if ages.now_ms.saturating_sub(last_user) > cfg.stale_user_data_ms {
        return KillDecision::cancel(KillReason::StaleUserData);
    }

    KillDecision::keep_quoting()
}
