//! Startup reconciliation runner.
//!
//! Cancel-all once at start to sweep any orphaned orders from a previous
//! process, then run a fresh loop. Quoting stays gated behind the resyncing
//! book until the first snapshot arrives; the report records when gating
//! released.

use serde::Serialize;

use pmq_core::{CancelAllOutcome, ExecutionClient};

use crate::error::EngineResult;
use crate::report::LoopReport;
use crate::scoring::ScoringChecker;
use crate::step_loop::{run_quote_loop, FixtureFeed, LoopConfig};

/// When the loop first saw a two-sided book, and when it first quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatingStats {
    pub first_snapshot_step: Option<u32>,
    pub first_quote_step: Option<u32>,
}

/// Startup-reconcile result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartupReport {
    pub startup_cancel_all: CancelAllOutcome,
    pub loop_report: LoopReport,
    pub gating: GatingStats,
}

/// Sweep, then run a fresh loop from clean in-memory state.
pub fn run_startup_reconcile<F, E, S>(
    cfg: &LoopConfig,
    feed: &mut F,
    executor: &mut E,
    scoring: &S,
) -> EngineResult<StartupReport>
where
    F: FixtureFeed,
    E: ExecutionClient,
    S: ScoringChecker,
{
    let startup_cancel_all = executor.cancel_all();

    // The loop only starts listening now; acks from the startup sweep belong
    // to the previous life and must not reach the fresh trackers.
    feed.drain_market();
    feed.drain_user();

    let loop_report = run_quote_loop(cfg, feed, executor, scoring)?;

    let mut first_snapshot_step = None;
    let mut first_quote_step = None;
    for entry in &loop_report.trace {
        if first_snapshot_step.is_none() && entry.best_bid.is_some() && entry.best_ask.is_some() {
            first_snapshot_step = Some(entry.i);
        }
        if first_quote_step.is_none() && !entry.placed.is_empty() {
            first_quote_step = Some(entry.i);
        }
    }

    Ok(StartupReport {
        startup_cancel_all,
        loop_report,
        gating: GatingStats {
            first_snapshot_step,
            first_quote_step,
        },
    })
}
