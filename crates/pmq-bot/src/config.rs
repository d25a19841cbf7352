//! Host configuration.
//!
//! TOML sections with serde defaults; every section can be omitted and the
//! host runs a sane demo setup. Malformed values are a fatal startup error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pmq_controls::{BucketConfig, KillSwitchConfig, ThrottleConfig};
use pmq_core::{MarketId, Price, Size};
use pmq_engine::{EngineConfig, LatchPolicy, LoopConfig, ScoringConfig, StampPolicy};
use pmq_strategy::{DiffConfig, QuoteConfig};

use crate::error::{AppError, AppResult};

/// Run shape: step count, cadence, simulated feed parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Steps during which the market feed advances. Defaults to all of them.
    #[serde(default)]
    pub active_market_steps: Option<u32>,
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    #[serde(default = "default_trace_max")]
    pub trace_max: usize,
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Outcome-token ids to quote.
    #[serde(default = "default_markets")]
    pub markets: Vec<String>,
    /// Simulated external midpoint at start.
    #[serde(default = "default_mid")]
    pub mid: f64,
    /// Simulated external top-of-book spread.
    #[serde(default = "default_ext_spread")]
    pub ext_spread: f64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            active_market_steps: None,
            step_ms: default_step_ms(),
            trace_max: default_trace_max(),
            seed: default_seed(),
            markets: default_markets(),
            mid: default_mid(),
            ext_spread: default_ext_spread(),
        }
    }
}

/// Quoting parameters on the (0, 1) grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSection {
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    #[serde(default = "default_half_spread")]
    pub half_spread: Decimal,
    #[serde(default = "default_max_spread")]
    pub max_spread: Decimal,
    #[serde(default = "default_min_size")]
    pub min_size: Decimal,
    #[serde(default = "default_order_size")]
    pub order_size: Decimal,
    #[serde(default = "default_inventory_target")]
    pub inventory_target: Decimal,
    #[serde(default = "default_max_skew")]
    pub max_skew: Decimal,
}

impl Default for QuoteSection {
    fn default() -> Self {
        Self {
            tick_size: default_tick_size(),
            half_spread: default_half_spread(),
            max_spread: default_max_spread(),
            min_size: default_min_size(),
            order_size: default_order_size(),
            inventory_target: default_inventory_target(),
            max_skew: default_max_skew(),
        }
    }
}

/// Staleness thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillSwitchSection {
    #[serde(default = "default_stale_market_data_ms")]
    pub stale_market_data_ms: u64,
    #[serde(default = "default_stale_user_data_ms")]
    pub stale_user_data_ms: u64,
}

impl Default for KillSwitchSection {
    fn default() -> Self {
        Self {
            stale_market_data_ms: default_stale_market_data_ms(),
            stale_user_data_ms: default_stale_user_data_ms(),
        }
    }
}

/// Reconciliation tolerances and churn caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSection {
    #[serde(default)]
    pub price_tolerance: Decimal,
    #[serde(default)]
    pub size_tolerance: Decimal,
    #[serde(default = "default_max_per_cycle")]
    pub max_cancels_per_cycle: usize,
    #[serde(default = "default_max_per_cycle")]
    pub max_places_per_cycle: usize,
}

impl Default for DiffSection {
    fn default() -> Self {
        Self {
            price_tolerance: Decimal::ZERO,
            size_tolerance: Decimal::ZERO,
            max_cancels_per_cycle: default_max_per_cycle(),
            max_places_per_cycle: default_max_per_cycle(),
        }
    }
}

/// Update-throttle section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleSection {
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

/// Token-bucket section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSection {
    #[serde(default = "default_bucket_capacity")]
    pub capacity: u32,
    #[serde(default = "default_refill_every_ms")]
    pub refill_every_ms: u64,
}

impl Default for BucketSection {
    fn default() -> Self {
        Self {
            capacity: default_bucket_capacity(),
            refill_every_ms: default_refill_every_ms(),
        }
    }
}

/// Scoring-checker section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSection {
    #[serde(default = "default_min_size")]
    pub min_size: Decimal,
    #[serde(default = "default_true")]
    pub require_top_of_book: bool,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            require_top_of_book: true,
        }
    }
}

/// Full host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunSection,
    #[serde(default)]
    pub quote: QuoteSection,
    #[serde(default)]
    pub kill_switch: KillSwitchSection,
    #[serde(default)]
    pub diff: DiffSection,
    #[serde(default)]
    pub throttle: ThrottleSection,
    #[serde(default)]
    pub token_bucket: BucketSection,
    #[serde(default)]
    pub scoring: ScoringSection,
}

impl AppConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate by constructing the engine-level configs.
    pub fn validate(&self) -> AppResult<()> {
        if self.run.markets.is_empty() {
            return Err(AppError::InvalidConfig("run.markets must not be empty".into()));
        }
        if let Some(active) = self.run.active_market_steps {
            if active > self.run.steps {
                return Err(AppError::InvalidConfig(
                    "run.active_market_steps must be <= run.steps".into(),
                ));
            }
        }
        // The engine re-validates, but failing at load time names the file.
        self.quote_config()
            .validate()
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    pub fn quote_config(&self) -> QuoteConfig {
        QuoteConfig {
            tick_size: Price::new(self.quote.tick_size),
            half_spread: Price::new(self.quote.half_spread),
            max_spread: Price::new(self.quote.max_spread),
            min_size: Size::new(self.quote.min_size),
            order_size: Size::new(self.quote.order_size),
            inventory_target: self.quote.inventory_target,
            max_skew: Price::new(self.quote.max_skew),
        }
    }

    pub fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            min_size: Size::new(self.scoring.min_size),
            require_top_of_book: self.scoring.require_top_of_book,
        }
    }

    /// Engine config for one market, with the host's latch and stamp choices:
    /// the transient startup cancel-all does not latch, and only applied
    /// events refresh market-data freshness.
    pub fn engine_config(&self, market: &str) -> EngineConfig {
        EngineConfig {
            market: MarketId::from(market),
            quote: self.quote_config(),
            kill_switch: KillSwitchConfig {
                stale_market_data_ms: self.kill_switch.stale_market_data_ms,
                stale_user_data_ms: self.kill_switch.stale_user_data_ms,
            },
            diff: DiffConfig {
                price_tolerance: Price::new(self.diff.price_tolerance),
                size_tolerance: Size::new(self.diff.size_tolerance),
                max_cancels_per_cycle: self.diff.max_cancels_per_cycle,
                max_places_per_cycle: self.diff.max_places_per_cycle,
            },
            throttle: ThrottleConfig {
                min_interval_ms: self.throttle.min_interval_ms,
            },
            token_bucket: BucketConfig {
                capacity: self.token_bucket.capacity,
                refill_every_ms: self.token_bucket.refill_every_ms,
            },
            latch_policy: LatchPolicy::ExceptStartup,
            stamp_policy: StampPolicy::AppliedOnly,
        }
    }

    pub fn loop_config(&self, market: &str) -> LoopConfig {
        LoopConfig {
            engine: self.engine_config(market),
            steps: self.run.steps,
            active_market_steps: self.run.active_market_steps.unwrap_or(self.run.steps),
            step_ms: self.run.step_ms,
            trace_max: self.run.trace_max,
        }
    }
}

fn default_steps() -> u32 {
    120
}
fn default_step_ms() -> u64 {
    1_000
}
fn default_trace_max() -> usize {
    pmq_engine::step_loop::DEFAULT_TRACE_MAX
}
fn default_seed() -> u32 {
    999
}
fn default_markets() -> Vec<String> {
    vec!["mkt_demo".to_string()]
}
fn default_mid() -> f64 {
    0.5
}
fn default_ext_spread() -> f64 {
    0.10
}
fn default_tick_size() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_half_spread() -> Decimal {
    Decimal::new(2, 2) // 0.02
}
fn default_max_spread() -> Decimal {
    Decimal::new(10, 2) // 0.10
}
fn default_min_size() -> Decimal {
    Decimal::ONE
}
fn default_order_size() -> Decimal {
    Decimal::ONE
}
fn default_inventory_target() -> Decimal {
    Decimal::TEN
}
fn default_max_skew() -> Decimal {
    Decimal::new(2, 2) // 0.02
}
fn default_stale_market_data_ms() -> u64 {
    30_000
}
fn default_stale_user_data_ms() -> u64 {
    60_000
}
fn default_max_per_cycle() -> usize {
    10
}
fn default_min_interval_ms() -> u64 {
    250
}
fn default_bucket_capacity() -> u32 {
    10
}
fn default_refill_every_ms() -> u64 {
    1_000
}
fn default_true() -> bool {
    true
}
