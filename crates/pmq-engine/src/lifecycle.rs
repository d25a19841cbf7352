//! Sequential market lifecycle runner.
//!
//! Run market A's loop, force an executor-level cancel-all on exit, then run
//! market B with entirely fresh component instances. "Reset" is represented
//! by constructing a new loop for B: no order book, tracker, throttle, or
//! bucket state may leak between phases.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use pmq_core::{CancelAllOutcome, ExecutionClient};

use crate::error::EngineResult;
use crate::report::LoopReport;
use crate::scoring::ScoringChecker;
use crate::step_loop::{run_quote_loop, FixtureFeed, MarketRun};

/// Phase boundaries at which the observer is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    AfterA,
    AfterExit,
    AfterReset,
    AfterB,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterA => write!(f, "after_a"),
            Self::AfterExit => write!(f, "after_exit"),
            Self::AfterReset => write!(f, "after_reset"),
            Self::AfterB => write!(f, "after_b"),
        }
    }
}

/// Lifecycle result with named observability snapshots per phase boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleReport {
    pub a: LoopReport,
    pub exit: CancelAllOutcome,
    pub b: LoopReport,
    pub snapshots: BTreeMap<String, serde_json::Value>,
}

/// Run A, exit (cancel-all), reset, run B.
///
/// The observer is called at each phase boundary; return `Value::Null` when
/// there is nothing to record.
pub fn run_market_lifecycle<FA, EA, SA, FB, EB, SB, O>(
    mut a: MarketRun<FA, EA, SA>,
    mut b: MarketRun<FB, EB, SB>,
    mut observe: O,
) -> EngineResult<LifecycleReport>
where
    FA: FixtureFeed,
    EA: ExecutionClient,
    SA: ScoringChecker,
    FB: FixtureFeed,
    EB: ExecutionClient,
    SB: ScoringChecker,
    O: FnMut(LifecyclePhase) -> serde_json::Value,
{
    let mut snapshots = BTreeMap::new();

    let report_a = run_quote_loop(&a.cfg, &mut a.feed, &mut a.executor, &a.scoring)?;
    snapshots.insert(LifecyclePhase::AfterA.to_string(), observe(LifecyclePhase::AfterA));

    // Exit must always cancel-all via the executor, regardless of what the
    // loop itself did.
    let exit = a.executor.cancel_all();
    snapshots.insert(
        LifecyclePhase::AfterExit.to_string(),
        observe(LifecyclePhase::AfterExit),
    );

    // Reset: market B starts from fresh instances built inside its own loop.
    snapshots.insert(
        LifecyclePhase::AfterReset.to_string(),
        observe(LifecyclePhase::AfterReset),
    );

    let report_b = run_quote_loop(&b.cfg, &mut b.feed, &mut b.executor, &b.scoring)?;
    snapshots.insert(LifecyclePhase::AfterB.to_string(), observe(LifecyclePhase::AfterB));

    Ok(LifecycleReport {
        a: report_a,
        exit,
        b: report_b,
        snapshots,
    })
}
