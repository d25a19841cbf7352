//! Per-market quoting engine.
//!
//! Owns one market's order book, trackers, and rate controls, and performs
//! one decision cycle at a time under caller-supplied milliseconds. All
//! execution goes through the injected `ExecutionClient`; failures come back
//! as `ok: false` outcomes and the next cycle re-reconciles from current
//! live-order state.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pmq_book::{ResyncBook, ResyncReason, TopLevel};
use pmq_controls::{
    decide, BucketConfig, DataAges, KillDecision, KillReason, KillSwitchConfig, ThrottleConfig,
    TokenBucket, UpdateThrottle,
};
use pmq_core::{
    ExecutionClient, MarketEvent, MarketId, OrderId, OrderSide, PlaceOrderRequest, Price, Size,
    UserEvent,
};
use pmq_state::{EconomicsLedger, LedgerSnapshot, OrderTracker, PositionSnapshot, PositionTracker};
use pmq_strategy::{compute_desired_quotes, diff_orders, DiffConfig, QuoteConfig};

use crate::error::EngineResult;
use crate::report::BookStatus;

/// Whether a kill-switch cancel-all latches "no further quoting" for the rest
/// of the run.
///
/// The two variants exist deliberately: deterministic replay runs latch on
/// every reason, while long-lived hosts treat the transient startup reason
/// (`no_market_data_yet`) as non-latching so quoting can begin once the feed
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatchPolicy {
    AllReasons,
    ExceptStartup,
}

/// When `last_market_data` advances for delta events.
///
/// Replay runs stamp every well-formed event (a gap delta still proves the
/// feed is alive, and the resulting cancel-all carries the more precise
/// `orderbook_resync_gap` reason); hosts stamp applied events only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampPolicy {
    AllEvents,
    AppliedOnly,
}

/// Full per-market engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub market: MarketId,
    pub quote: QuoteConfig,
    pub kill_switch: KillSwitchConfig,
    pub diff: DiffConfig,
    pub throttle: ThrottleConfig,
    pub token_bucket: BucketConfig,
    pub latch_policy: LatchPolicy,
    pub stamp_policy: StampPolicy,
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.quote.validate()?;
        if self.token_bucket.refill_every_ms == 0 {
            return Err(crate::error::EngineError::InvalidConfig(
                "token_bucket.refill_every_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// One attempted placement, with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedAttempt {
    pub side: OrderSide,
    pub price: Price,
    pub size: Size,
    pub ok: bool,
    pub reason: Option<String>,
}

/// Why a cycle did not quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    CancelAllTriggered,
    OrderbookResync,
    NoTopOfBook,
}

/// What one decision cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Kill switch fired; all resting orders were swept.
    CancelAll {
        reason: KillReason,
        ok: bool,
        canceled: u32,
    },
    /// Quoting suppressed for a business reason.
    Suppressed { reason: SuppressReason },
    /// Nothing to do, or the update throttle denied the cycle.
    Idle,
    /// Reconciliation ran.
    Update {
        /// Cancels acknowledged by the executor.
        canceled: Vec<OrderId>,
        /// Cancels attempted (acknowledged or rejected).
        cancel_calls: u32,
        /// Every attempted placement with its outcome.
        placed: Vec<PlacedAttempt>,
        /// Token-bucket denials that stopped the batch early.
        denied: u32,
    },
}

/// Serializable engine status for observability snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub market: MarketId,
    pub orderbook: BookStatus,
    pub midpoint: Option<Decimal>,
    pub inventory: Decimal,
    pub live_orders: usize,
    pub last_market_data_age_ms: Option<u64>,
    pub last_user_data_age_ms: Option<u64>,
    pub kill_switch: KillDecision,
    pub cancel_all_triggered: bool,
    pub rejections: BTreeMap<String, u64>,
}

/// Per-market quoting engine.
pub struct QuoteEngine {
    cfg: EngineConfig,
    book: ResyncBook,
    orders: OrderTracker,
    position: PositionTracker,
    ledger: EconomicsLedger,
    throttle: UpdateThrottle,
    bucket: TokenBucket,
    last_market_data_ms: Option<u64>,
    last_user_data_ms: Option<u64>,
    cancel_all_triggered: bool,
    last_kill: KillDecision,
    rejections: BTreeMap<String, u64>,
}

impl QuoteEngine {
    pub fn new(cfg: EngineConfig) -> EngineResult<Self> {
        cfg.validate()?;
        let throttle = UpdateThrottle::from_config(&cfg.throttle);
        let bucket = TokenBucket::from_config(&cfg.token_bucket);
        Ok(Self {
            cfg,
            book: ResyncBook::new(),
            orders: OrderTracker::new(),
            position: PositionTracker::new(),
            ledger: EconomicsLedger::default(),
            throttle,
            bucket,
            last_market_data_ms: None,
            last_user_data_ms: None,
            cancel_all_triggered: false,
            last_kill: KillDecision::keep_quoting(),
            rejections: BTreeMap::new(),
        })
    }

    pub fn market(&self) -> &MarketId {
        &self.cfg.market
    }

    /// Ingest one normalized market event.
    pub fn ingest_market(&mut self, now_ms: u64, event: &MarketEvent) {
        match event {
            MarketEvent::Book { seq, bids, asks } => {
                self.book.apply_snapshot(*seq, bids, asks);
                self.last_market_data_ms = Some(now_ms);
            }
            MarketEvent::PriceChange {
                seq,
                side,
                price,
                size,
            } => {
                let outcome = self.book.apply_delta(*seq, *side, *price, *size);
                let stamp = match self.cfg.stamp_policy {
                    StampPolicy::AllEvents => true,
                    StampPolicy::AppliedOnly => outcome.applied(),
                };
                if stamp {
                    self.last_market_data_ms = Some(now_ms);
                }
            }
        }
    }

    /// Ingest one normalized user event, updating all trackers.
    pub fn ingest_user(&mut self, now_ms: u64, event: &UserEvent) -> EngineResult<()> {
        self.last_user_data_ms = Some(now_ms);
        self.orders.apply(event)?;
        self.position.apply(event)?;
        self.ledger.apply(event)?;
        Ok(())
    }

    /// Run one decision cycle at `now_ms`.
    pub fn cycle<E: ExecutionClient + ?Sized>(
        &mut self,
        now_ms: u64,
        executor: &mut E,
    ) -> EngineResult<CycleOutcome> {
        let inventory = self.position.position();
        let best_bid = self.book.best_bid();
        let best_ask = self.book.best_ask();

        let mut kill = decide(
            DataAges {
                now_ms,
                last_market_data_ms: self.last_market_data_ms,
                last_user_data_ms: self.last_user_data_ms,
            },
            &self.cfg.kill_switch,
        );

        // Order-book integrity overrides staleness-based decisions: if the
        // local book is inconsistent, cancel-all and refuse to quote until a
        // fresh snapshot arrives.
        if self.book.needs_resync() && self.book.last_gap().is_some() {
            kill = KillDecision::cancel(KillReason::OrderbookResyncGap);
        } else if self.book.needs_resync()
            && self.book.last_resync_reason().is_some_and(|r| r.is_crossed())
        {
            kill = KillDecision::cancel(KillReason::OrderbookCrossed);
        } else if let (Some(bb), Some(ba)) = (best_bid, best_ask) {
            if bb.price >= ba.price {
                self.book.enter_resync(ResyncReason::CrossedBookObserved);
                kill = KillDecision::cancel(KillReason::OrderbookCrossed);
            }
        }
        self.last_kill = kill;

        if kill.cancel_all {
            let reason = kill.reason.expect("cancel_all decision carries a reason");
            warn!(market = %self.cfg.market, %reason, "kill switch: canceling all orders");
            let outcome = executor.cancel_all();
            if self.should_latch(reason) {
                self.cancel_all_triggered = true;
            }
            return Ok(CycleOutcome::CancelAll {
                reason,
                ok: outcome.ok,
                canceled: outcome.canceled,
            });
        }

        if self.cancel_all_triggered {
            return Ok(CycleOutcome::Suppressed {
                reason: SuppressReason::CancelAllTriggered,
            });
        }
        if self.book.needs_resync() {
            return Ok(CycleOutcome::Suppressed {
                reason: SuppressReason::OrderbookResync,
            });
        }
        let (Some(bb), Some(ba)) = (best_bid, best_ask) else {
            return Ok(CycleOutcome::Suppressed {
                reason: SuppressReason::NoTopOfBook,
            });
        };

        let desired = compute_desired_quotes(bb, ba, inventory, &self.cfg.quote)?;
        let live = self.orders.live_orders();
        let diff = diff_orders(&desired.to_vec(), &live, &self.cfg.diff);

        if diff.is_empty() || !self.throttle.can_update(now_ms)? {
            return Ok(CycleOutcome::Idle);
        }
        self.throttle.mark_updated(now_ms)?;

        let mut canceled = Vec::new();
        let mut cancel_calls = 0u32;
        let mut placed = Vec::new();
        let mut denied = 0u32;

        for id in &diff.cancel {
            if !self.bucket.try_take(now_ms, 1)?.ok {
                denied += 1;
                break;
            }
            cancel_calls += 1;
            let outcome = executor.cancel_order(id);
            if outcome.ok {
                canceled.push(id.clone());
            } else {
                self.record_rejection(outcome.reason);
            }
        }

        for order in &diff.place {
            if !self.bucket.try_take(now_ms, 1)?.ok {
                denied += 1;
                break;
            }
            let outcome = executor.place_order(&PlaceOrderRequest {
                market: self.cfg.market.clone(),
                side: order.side,
                price: order.price,
                size: order.size,
            });
            if !outcome.ok {
                self.record_rejection(outcome.reason.clone());
            }
            placed.push(PlacedAttempt {
                side: order.side,
                price: order.price,
                size: order.size,
                ok: outcome.ok,
                reason: outcome.reason,
            });
        }

        debug!(
            market = %self.cfg.market,
            cancels = cancel_calls,
            places = placed.len(),
            denied,
            "reconciliation cycle"
        );
        Ok(CycleOutcome::Update {
            canceled,
            cancel_calls,
            placed,
            denied,
        })
    }

    fn should_latch(&self, reason: KillReason) -> bool {
        match self.cfg.latch_policy {
            LatchPolicy::AllReasons => true,
            LatchPolicy::ExceptStartup => !reason.is_startup(),
        }
    }

    fn record_rejection(&mut self, reason: Option<String>) {
        let key = reason.unwrap_or_else(|| "unknown".to_string());
        info!(market = %self.cfg.market, reason = %key, "execution rejected");
        *self.rejections.entry(key).or_insert(0) += 1;
    }

    pub fn best_bid(&self) -> Option<TopLevel> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<TopLevel> {
        self.book.best_ask()
    }

    pub fn book_seq(&self) -> Option<u64> {
        self.book.seq()
    }

    pub fn needs_resync(&self) -> bool {
        self.book.needs_resync()
    }

    pub fn inventory(&self) -> Decimal {
        self.position.position()
    }

    pub fn live_orders(&self) -> Vec<pmq_core::LiveOrder> {
        self.orders.live_orders()
    }

    pub fn position_snapshot(&self) -> PositionSnapshot {
        self.position.snapshot()
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn cancel_all_triggered(&self) -> bool {
        self.cancel_all_triggered
    }

    pub fn last_kill(&self) -> KillDecision {
        self.last_kill
    }

    /// Order-book status for traces and snapshots.
    pub fn book_status(&self) -> BookStatus {
        BookStatus::of(&self.book)
    }

    /// Stable status snapshot for observability.
    pub fn status(&self, now_ms: u64) -> EngineStatus {
        let bb = self.book.best_bid();
        let ba = self.book.best_ask();
        EngineStatus {
            market: self.cfg.market.clone(),
            orderbook: self.book_status(),
            midpoint: match (bb, ba) {
                (Some(bb), Some(ba)) => Some(Price::midpoint(bb.price, ba.price).inner()),
                _ => None,
            },
            inventory: self.position.position(),
            live_orders: self.orders.len(),
            last_market_data_age_ms: self.last_market_data_ms.map(|t| now_ms.saturating_sub(t)),
            last_user_data_age_ms: self.last_user_data_ms.map(|t| now_ms.saturating_sub(t)),
            kill_switch: self.last_kill,
            cancel_all_triggered: self.cancel_all_triggered,
            rejections: self.rejections.clone(),
        }
    }
}
