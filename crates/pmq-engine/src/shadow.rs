//! Read-only shadow engine.
//!
//! Identical event ingestion and quote computation to the trading engine, but
//! never calls placement or cancellation. Used for dry-run observability and
//! for cross-checking that a trading run's internal state agrees with a
//! shadow run fed the same events.

use rust_decimal::Decimal;
use serde::Serialize;

use pmq_book::{ResyncBook, ResyncReason};
use pmq_controls::{decide, DataAges, KillDecision, KillReason, KillSwitchConfig};
use pmq_core::{DesiredOrder, LiveOrder, MarketEvent, MarketId, Price, UserEvent};
use pmq_state::{OrderTracker, PositionSnapshot, PositionTracker};
use pmq_strategy::{compute_desired_quotes, QuoteConfig};

use crate::error::{EngineError, EngineResult};
use crate::report::BookStatus;
use crate::step_loop::FixtureFeed;

/// Why the shadow computed no quotes this step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSuppressedReason {
    KillSwitch(KillReason),
    OrderbookResync,
    NoTopOfBook,
    CrossedBook,
}

/// Stable per-step status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowSnapshot {
    pub i: u32,
    pub now_ms: u64,
    pub market: MarketId,
    pub orderbook: BookStatus,
    pub midpoint: Option<Decimal>,
    pub inventory: Decimal,
    pub live_orders: Vec<LiveOrder>,
    pub last_market_data_age_ms: Option<u64>,
    pub last_user_data_age_ms: Option<u64>,
    pub kill_switch: KillDecision,
    pub quote_suppressed_reason: Option<QuoteSuppressedReason>,
    pub desired_quotes: Vec<DesiredOrder>,
}

/// End-of-run shadow state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowFinal {
    pub orderbook: BookStatus,
    #[serde(flatten)]
    pub position: PositionSnapshot,
    pub live_orders: Vec<LiveOrder>,
}

/// Deterministic, read-only engine.
pub struct ShadowEngine {
    market: MarketId,
    quote: QuoteConfig,
    kill_switch: KillSwitchConfig,
    book: ResyncBook,
    orders: OrderTracker,
    position: PositionTracker,
    last_market_data_ms: Option<u64>,
    last_user_data_ms: Option<u64>,
}

impl ShadowEngine {
    pub fn new(
        market: MarketId,
        quote: QuoteConfig,
        kill_switch: KillSwitchConfig,
    ) -> EngineResult<Self> {
        quote.validate()?;
        Ok(Self {
            market,
            quote,
            kill_switch,
            book: ResyncBook::new(),
            orders: OrderTracker::new(),
            position: PositionTracker::new(),
            last_market_data_ms: None,
            last_user_data_ms: None,
        })
    }

    pub fn ingest_market(&mut self, now_ms: u64, event: &MarketEvent) {
        match event {
            MarketEvent::Book { seq, bids, asks } => {
                self.book.apply_snapshot(*seq, bids, asks);
            }
            MarketEvent::PriceChange {
                seq,
                side,
                price,
                size,
            } => {
                self.book.apply_delta(*seq, *side, *price, *size);
            }
        }
        self.last_market_data_ms = Some(now_ms);
    }

    pub fn ingest_user(&mut self, now_ms: u64, event: &UserEvent) -> EngineResult<()> {
        self.last_user_data_ms = Some(now_ms);
        self.orders.apply(event)?;
        self.position.apply(event)?;
        Ok(())
    }

    /// Compute the stable status snapshot for one step.
    pub fn snapshot(&mut self, i: u32, now_ms: u64) -> EngineResult<ShadowSnapshot> {
        let inventory = self.position.position();
        let best_bid = self.book.best_bid();
        let best_ask = self.book.best_ask();
        let kill = decide(
            DataAges {
                now_ms,
                last_market_data_ms: self.last_market_data_ms,
                last_user_data_ms: self.last_user_data_ms,
            },
            &self.kill_switch,
        );

        let mut suppressed = None;
        let mut desired_quotes = Vec::new();

        if kill.cancel_all {
            suppressed = Some(QuoteSuppressedReason::KillSwitch(
                kill.reason.expect("cancel_all decision carries a reason"),
            ));
        } else if self.book.needs_resync() {
            suppressed = Some(QuoteSuppressedReason::OrderbookResync);
        } else {
            match (best_bid, best_ask) {
                (Some(bb), Some(ba)) if bb.price >= ba.price => {
                    // Live feeds can momentarily go out of sync; a crossed
                    // book is a hard resync condition even in shadow mode.
                    self.book.enter_resync(ResyncReason::CrossedBookObserved);
                    suppressed = Some(QuoteSuppressedReason::CrossedBook);
                }
                (Some(bb), Some(ba)) => {
                    desired_quotes =
                        compute_desired_quotes(bb, ba, inventory, &self.quote)?.to_vec();
                }
                _ => suppressed = Some(QuoteSuppressedReason::NoTopOfBook),
            }
        }

        Ok(ShadowSnapshot {
            i,
            now_ms,
            market: self.market.clone(),
            orderbook: BookStatus::of(&self.book),
            midpoint: match (best_bid, best_ask) {
                (Some(bb), Some(ba)) => Some(Price::midpoint(bb.price, ba.price).inner()),
                _ => None,
            },
            inventory,
            live_orders: self.orders.live_orders(),
            last_market_data_age_ms: self.last_market_data_ms.map(|t| now_ms.saturating_sub(t)),
            last_user_data_age_ms: self.last_user_data_ms.map(|t| now_ms.saturating_sub(t)),
            kill_switch: kill,
            quote_suppressed_reason: suppressed,
            desired_quotes,
        })
    }

    pub fn state_final(&self) -> ShadowFinal {
        ShadowFinal {
            orderbook: BookStatus::of(&self.book),
            position: self.position.snapshot(),
            live_orders: self.orders.live_orders(),
        }
    }
}

/// Shadow loop configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowLoopConfig {
    pub market: MarketId,
    pub quote: QuoteConfig,
    pub kill_switch: KillSwitchConfig,
    pub steps: u32,
    pub active_market_steps: u32,
    pub step_ms: u64,
    pub trace_max: usize,
}

impl ShadowLoopConfig {
    fn validate(&self) -> EngineResult<()> {
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
        self.quote.validate()?;
        Ok(())
    }
}

/// Report of one shadow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowReport {
    pub last: Option<ShadowSnapshot>,
    pub history: Vec<ShadowSnapshot>,
    pub state_final: ShadowFinal,
}

/// Run the read-only loop over the same event interfaces as the trading loop.
pub fn run_shadow_loop<F: FixtureFeed>(
    cfg: &ShadowLoopConfig,
    feed: &mut F,
) -> EngineResult<ShadowReport> {
    cfg.validate()?;

    let mut engine = ShadowEngine::new(cfg.market.clone(), cfg.quote.clone(), cfg.kill_switch)?;
    let mut history: Vec<ShadowSnapshot> = Vec::new();

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

        if history.len() < cfg.trace_max {
            history.push(engine.snapshot(i, now_ms)?);
        }
    }

    Ok(ShadowReport {
        last: history.last().cloned(),
        history,
        state_final: engine.state_final(),
    })
}
