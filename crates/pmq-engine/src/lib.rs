//! Per-market quoting engine and deterministic runners.
//!
//! The engine composes the leaf components in a fixed per-cycle order:
//! ingest events, evaluate the kill switch under order-book integrity
//! overrides, then either cancel everything or reconcile desired quotes
//! against live orders under the throttle and the action budget.
//!
//! # Architecture
//!
//! ```text
//! events -> QuoteEngine.ingest_market / ingest_user
//!            |- ResyncBook: sequenced reconstruction
//!            |- OrderTracker / PositionTracker / EconomicsLedger
//! step   -> QuoteEngine.cycle()
//!            |- kill switch (staleness + integrity overrides)
//!            |- compute_desired_quotes -> diff_orders
//!            |- UpdateThrottle / TokenBucket
//!            \- ExecutionClient.place / cancel / cancel_all
//! ```
//!
//! Runners: the fixture-driven step loop, a read-only shadow variant, the
//! multi-market fan-out, the sequential lifecycle runner, and the startup
//! reconcile wrapper.

pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod multi_market;
pub mod report;
pub mod scoring;
pub mod shadow;
pub mod startup;
pub mod step_loop;

pub use engine::{
    CycleOutcome, EngineConfig, EngineStatus, LatchPolicy, PlacedAttempt, QuoteEngine,
    StampPolicy, SuppressReason,
};
pub use error::{EngineError, EngineResult};
pub use lifecycle::{run_market_lifecycle, LifecyclePhase, LifecycleReport};
pub use multi_market::{run_multi_market, MarketRunReport, MultiMarketReport, MultiMarketTraceEntry};
pub use report::{
    BookStatus, ChurnSummary, FinalFlags, FinalState, LoopReport, ScoringSummary, ScoringTotals,
    SideScore, StepScores, TraceEntry,
};
pub use scoring::{
    RewardsScoringChecker, ScoreReason, ScoringChecker, ScoringConfig, ScoringContext,
    ScoringResult,
};
pub use shadow::{
    run_shadow_loop, QuoteSuppressedReason, ShadowEngine, ShadowFinal, ShadowLoopConfig,
    ShadowReport, ShadowSnapshot,
};
pub use startup::{run_startup_reconcile, GatingStats, StartupReport};
pub use step_loop::{run_quote_loop, FixtureFeed, LoopConfig, MarketRun};
