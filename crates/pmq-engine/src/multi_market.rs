//! Multi-market fan-out.
//!
//! Runs one independent loop instance per market in a single deterministic
//! pass. Every market owns disjoint component instances and its own executor;
//! a kill switch in one market is not observable in another. A concurrent
//! host gets the same isolation by giving each market its own task.

use serde::Serialize;

use pmq_core::{ExecutionClient, MarketId};

use crate::error::{EngineError, EngineResult};
use crate::report::{ChurnSummary, FinalFlags, FinalState, ScoringTotals, TraceEntry};
use crate::scoring::ScoringChecker;
use crate::step_loop::{run_quote_loop, FixtureFeed, MarketRun};

/// One market's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRunReport {
    pub market: MarketId,
    pub churn: ChurnSummary,
    pub scoring_totals: ScoringTotals,
    pub state_final: FinalState,
    pub outcome: FinalFlags,
}

/// One market's trace entry, tagged with its market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMarketTraceEntry {
    pub market: MarketId,
    #[serde(flatten)]
    pub entry: TraceEntry,
}

/// Merged report across markets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMarketReport {
    pub per_market: Vec<MarketRunReport>,
    pub trace: Vec<MultiMarketTraceEntry>,
}

/// Run each market's loop in turn.
pub fn run_multi_market<F, E, S>(items: Vec<MarketRun<F, E, S>>) -> EngineResult<MultiMarketReport>
where
    F: FixtureFeed,
    E: ExecutionClient,
    S: ScoringChecker,
{
    if items.is_empty() {
        return Err(EngineError::InvalidConfig(
            "multi-market run needs at least one market".into(),
        ));
    }

    let mut per_market = Vec::with_capacity(items.len());
    let mut trace = Vec::new();

    for mut item in items {
        let market = item.cfg.engine.market.clone();
        let report = run_quote_loop(&item.cfg, &mut item.feed, &mut item.executor, &item.scoring)?;

        for entry in &report.trace {
            trace.push(MultiMarketTraceEntry {
                market: market.clone(),
                entry: entry.clone(),
            });
        }
        per_market.push(MarketRunReport {
            market,
            churn: report.churn,
            scoring_totals: report.scoring.totals,
            state_final: report.state_final,
            outcome: report.outcome,
        });
    }

    Ok(MultiMarketReport { per_market, trace })
}
