//! Deterministic fixture-driven step loop.
//!
//! All time derives from `(step index, step_ms)`; no wall clock anywhere.
//! Each step ingests whatever the feed produced, runs one engine cycle, then
//! scores the best live order per side. The returned report is
//! JSON-serializable and suitable for proof artifacts.

use tracing::debug;

pub use pmq_core::FixtureFeed;

use pmq_core::{ExecutionClient, LiveOrder, OrderSide};

use crate::engine::{CycleOutcome, EngineConfig, QuoteEngine};
use crate::error::{EngineError, EngineResult};
use crate::report::{
    ChurnSummary, FinalFlags, FinalState, LoopReport, ScoringStep, ScoringSummary, SideScore,
    StepScores, TraceEntry,
};
use crate::scoring::{ScoringChecker, ScoringContext};

pub const DEFAULT_TRACE_MAX: usize = 400;

/// Step-loop configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub engine: EngineConfig,
    pub steps: u32,
    /// Steps during which the market feed advances; afterwards the feed goes
    /// silent and the staleness kill switch takes over.
    pub active_market_steps: u32,
    pub step_ms: u64,
    pub trace_max: usize,
}

impl LoopConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.steps < 1 {
            return Err(EngineError::InvalidConfig("steps must be >= 1".into()));
        }
        if self.active_market_steps > self.steps {
            return Err(EngineError::InvalidConfig(
                "active_market_steps must be <= steps".into(),
            ));
        }
        if self.step_ms < 1 {
            return Err(EngineError::InvalidConfig("step_ms must be >= 1".into()));
        }
        self.engine.validate()
    }
}

/// Everything needed to run one market's loop. Used by the orchestration
/// runners; `run_quote_loop` borrows the pieces directly.
pub struct MarketRun<F, E, S> {
    pub cfg: LoopConfig,
    pub feed: F,
    pub executor: E,
    pub scoring: S,
}

fn best_per_side(live: &[LiveOrder]) -> (Option<&LiveOrder>, Option<&LiveOrder>) {
    let mut best_buy: Option<&LiveOrder> = None;
    let mut best_sell: Option<&LiveOrder> = None;
    for order in live {
        match order.side {
            OrderSide::Buy => {
                if best_buy.map_or(true, |b| order.price > b.price) {
                    best_buy = Some(order);
                }
            }
            OrderSide::Sell => {
                if best_sell.map_or(true, |b| order.price < b.price) {
                    best_sell = Some(order);
                }
            }
        }
    }
    (best_buy, best_sell)
}

/// Run the deterministic quoting loop.
pub fn run_quote_loop<F, E, S>(
    cfg: &LoopConfig,
    feed: &mut F,
    executor: &mut E,
    scoring: &S,
) -> EngineResult<LoopReport>
where
    F: FixtureFeed,
    E: ExecutionClient,
    S: ScoringChecker,
{
    cfg.validate()?;

    let mut engine = QuoteEngine::new(cfg.engine.clone())?;
    let mut churn = ChurnSummary {
        steps: cfg.steps,
        ..ChurnSummary::default()
    };
    let mut scoring_summary = ScoringSummary {
        steps: cfg.steps,
        ..ScoringSummary::default()
    };
    let mut trace: Vec<TraceEntry> = Vec::new();

    for i in 0..cfg.steps {
        let now_ms = u64::from(i) * cfg.step_ms;

        if i < cfg.active_market_steps {
            feed.step_market();
        }
        for event in feed.drain_market() {
            engine.ingest_market(now_ms, &event);
        }
        for event in feed.drain_user() {
            engine.ingest_user(now_ms, &event)?;
        }

        let best_bid = engine.best_bid();
        let best_ask = engine.best_ask();
        let inventory = engine.inventory();
        let market_seq = engine.book_seq();

        let outcome = engine.cycle(now_ms, executor)?;

        // Execution calls produce synchronous venue acks (opens, cancels);
        // fold them in before scoring so this step sees its own orders.
        for event in feed.drain_user() {
            engine.ingest_user(now_ms, &event)?;
        }

        let (step_canceled, step_placed) = match outcome {
            CycleOutcome::CancelAll {
                reason,
                canceled,
                ok: _,
            } => {
                churn.cancel_all_calls += 1;
                churn.cancel_all_canceled += canceled;
                churn.last_kill_reason = Some(reason.to_string());
                (Vec::new(), Vec::new())
            }
            CycleOutcome::Update {
                canceled,
                cancel_calls,
                placed,
                denied,
            } => {
                churn.quote_update_cycles += 1;
                churn.cancel_calls += cancel_calls;
                churn.cancel_ok += canceled.len() as u32;
                churn.place_calls += placed.len() as u32;
                churn.place_ok += placed.iter().filter(|p| p.ok).count() as u32;
                churn.token_bucket_denied += denied;
                (canceled, placed)
            }
            CycleOutcome::Suppressed { .. } | CycleOutcome::Idle => (Vec::new(), Vec::new()),
        };

        // Score the best live order per side.
        let live = engine.live_orders();
        let (best_buy, best_sell) = best_per_side(&live);
        let score_side = |side: OrderSide, order: Option<&LiveOrder>| -> SideScore {
            match order {
                None => SideScore::no_order(),
                Some(o) => {
                    let result = scoring.check_order(&ScoringContext {
                        side,
                        price: o.price,
                        size: o.remaining,
                        best_bid,
                        best_ask,
                    });
                    SideScore {
                        scoring: result.scoring,
                        reason: result.reason,
                        price: Some(o.price),
                        size: Some(o.remaining),
                    }
                }
            }
        };
        let scores = StepScores {
            buy: score_side(OrderSide::Buy, best_buy),
            sell: score_side(OrderSide::Sell, best_sell),
        };
        scoring_summary.totals.record(&scores.buy);
        scoring_summary.totals.record(&scores.sell);
        scoring_summary.by_step.push(ScoringStep { i, now_ms, scores });

        if trace.len() < cfg.trace_max {
            trace.push(TraceEntry {
                i,
                now_ms,
                market_seq,
                best_bid,
                best_ask,
                inventory,
                live_orders: live.len(),
                kill_switch: engine.last_kill(),
                canceled: step_canceled,
                placed: step_placed,
                scoring: scores,
            });
        }
    }

    debug!(
        market = %engine.market(),
        steps = cfg.steps,
        updates = churn.quote_update_cycles,
        cancel_alls = churn.cancel_all_calls,
        "loop finished"
    );

    let outcome = FinalFlags {
        cancel_all_triggered: engine.cancel_all_triggered(),
        last_kill_reason: churn.last_kill_reason.clone(),
    };
    Ok(LoopReport {
        churn,
        scoring: scoring_summary,
        trace,
        state_final: FinalState {
            position: engine.position_snapshot(),
            live_orders: engine.live_orders(),
            economics: engine.ledger_snapshot(),
        },
        outcome,
    })
}
