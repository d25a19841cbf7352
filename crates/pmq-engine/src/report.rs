//! Serializable trace and summary records.
//!
//! These are observability artifacts suitable for append-only journaling, not
//! part of the engine's behavioral contract.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use pmq_book::{ResyncBook, SeqGap, TopLevel};
use pmq_controls::KillDecision;
use pmq_core::{LiveOrder, OrderId, Price, Size};
use pmq_state::{LedgerSnapshot, PositionSnapshot};

use crate::engine::PlacedAttempt;
use crate::scoring::ScoreReason;

/// Order-book status at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookStatus {
    pub seq: Option<u64>,
    pub needs_resync: bool,
    pub gap: Option<SeqGap>,
    pub resync_reason: Option<String>,
    pub best_bid: Option<TopLevel>,
    pub best_ask: Option<TopLevel>,
}

impl BookStatus {
    pub fn of(book: &ResyncBook) -> Self {
        Self {
            seq: book.seq(),
            needs_resync: book.needs_resync(),
            gap: book.last_gap(),
            resync_reason: book.last_resync_reason().map(|r| r.to_string()),
            best_bid: book.best_bid(),
            best_ask: book.best_ask(),
        }
    }
}

/// Outbound-action accounting for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChurnSummary {
    pub steps: u32,
    pub quote_update_cycles: u32,
    pub place_calls: u32,
    pub place_ok: u32,
    pub cancel_calls: u32,
    pub cancel_ok: u32,
    pub cancel_all_calls: u32,
    pub cancel_all_canceled: u32,
    pub token_bucket_denied: u32,
    pub last_kill_reason: Option<String>,
}

/// Scoring verdict for one side at one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideScore {
    pub scoring: bool,
    pub reason: ScoreReason,
    pub price: Option<Price>,
    pub size: Option<Size>,
}

impl SideScore {
    pub fn no_order() -> Self {
        Self {
            scoring: false,
            reason: ScoreReason::NoOrder,
            price: None,
            size: None,
        }
    }
}

/// Both sides' verdicts at one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepScores {
    pub buy: SideScore,
    pub sell: SideScore,
}

/// Aggregated scoring counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringTotals {
    pub scoring: u32,
    pub non_scoring: u32,
    pub by_reason: BTreeMap<String, u32>,
}

impl ScoringTotals {
    pub fn record(&mut self, score: &SideScore) {
        if score.scoring {
            self.scoring += 1;
        } else {
            self.non_scoring += 1;
        }
        *self.by_reason.entry(score.reason.to_string()).or_insert(0) += 1;
    }
}

/// Per-step scoring entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringStep {
    pub i: u32,
    pub now_ms: u64,
    #[serde(flatten)]
    pub scores: StepScores,
}

/// Scoring accounting for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringSummary {
    pub steps: u32,
    pub totals: ScoringTotals,
    pub by_step: Vec<ScoringStep>,
}

/// One bounded trace entry per step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub i: u32,
    pub now_ms: u64,
    pub market_seq: Option<u64>,
    pub best_bid: Option<TopLevel>,
    pub best_ask: Option<TopLevel>,
    pub inventory: Decimal,
    pub live_orders: usize,
    pub kill_switch: KillDecision,
    pub canceled: Vec<OrderId>,
    pub placed: Vec<PlacedAttempt>,
    pub scoring: StepScores,
}

/// End-of-run state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalState {
    #[serde(flatten)]
    pub position: PositionSnapshot,
    pub live_orders: Vec<LiveOrder>,
    pub economics: LedgerSnapshot,
}

/// End-of-run flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalFlags {
    pub cancel_all_triggered: bool,
    pub last_kill_reason: Option<String>,
}

/// Full report of one deterministic loop run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopReport {
    pub churn: ChurnSummary,
    pub scoring: ScoringSummary,
    pub trace: Vec<TraceEntry>,
    pub state_final: FinalState,
    pub outcome: FinalFlags,
}
