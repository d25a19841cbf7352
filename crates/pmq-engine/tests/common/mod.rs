//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;

use rust_decimal_macros::dec;

use pmq_controls::{BucketConfig, KillSwitchConfig, ThrottleConfig};
use pmq_core::{FixtureFeed, MarketEvent, MarketId, Price, Size, UserEvent};
use pmq_engine::{
    EngineConfig, LatchPolicy, LoopConfig, RewardsScoringChecker, ScoringConfig, StampPolicy,
};
use pmq_sim::SimFeed;
use pmq_strategy::{DiffConfig, QuoteConfig};

/// Market events come from a script (one batch per step); user events come
/// from the simulated venue, which acks executions synchronously.
pub struct ScriptedFeed {
    sim: SimFeed,
    script: VecDeque<Vec<MarketEvent>>,
    pending: Vec<MarketEvent>,
}

impl ScriptedFeed {
    pub fn new(sim: SimFeed, script: Vec<Vec<MarketEvent>>) -> Self {
        Self {
            sim,
            script: script.into(),
            pending: Vec::new(),
        }
    }
}

impl FixtureFeed for ScriptedFeed {
    fn step_market(&mut self) {
        if let Some(events) = self.script.pop_front() {
            self.pending.extend(events);
        }
    }

    fn drain_market(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.pending)
    }

    fn drain_user(&mut self) -> Vec<UserEvent> {
        self.sim.drain_user()
    }
}

/// Market-event-only scripted feed with no user channel at all.
pub struct MarketOnlyFeed {
    script: VecDeque<Vec<MarketEvent>>,
    pending: Vec<MarketEvent>,
}

impl MarketOnlyFeed {
    pub fn new(script: Vec<Vec<MarketEvent>>) -> Self {
        Self {
            script: script.into(),
            pending: Vec::new(),
        }
    }
}

impl FixtureFeed for MarketOnlyFeed {
    fn step_market(&mut self) {
        if let Some(events) = self.script.pop_front() {
            self.pending.extend(events);
        }
    }

    fn drain_market(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.pending)
    }

    fn drain_user(&mut self) -> Vec<UserEvent> {
        Vec::new()
    }
}

pub fn quote_cfg() -> QuoteConfig {
    QuoteConfig {
        tick_size: Price::new(dec!(0.01)),
        half_spread: Price::new(dec!(0.02)),
        max_spread: Price::new(dec!(0.10)),
        min_size: Size::new(dec!(1)),
        order_size: Size::new(dec!(1)),
        inventory_target: dec!(10),
        max_skew: Price::new(dec!(0.02)),
    }
}

pub fn engine_cfg(market: &str) -> EngineConfig {
    EngineConfig {
        market: MarketId::from(market),
        quote: quote_cfg(),
        kill_switch: KillSwitchConfig {
            stale_market_data_ms: 30_000,
            stale_user_data_ms: 60_000,
        },
        diff: DiffConfig {
            price_tolerance: Price::ZERO,
            size_tolerance: Size::ZERO,
            max_cancels_per_cycle: 10,
            max_places_per_cycle: 10,
        },
        throttle: ThrottleConfig { min_interval_ms: 0 },
        token_bucket: BucketConfig {
            capacity: 10,
            refill_every_ms: 1_000,
        },
        latch_policy: LatchPolicy::AllReasons,
        stamp_policy: StampPolicy::AllEvents,
    }
}

pub fn loop_cfg(market: &str, steps: u32, active: u32) -> LoopConfig {
    LoopConfig {
        engine: engine_cfg(market),
        steps,
        active_market_steps: active,
        step_ms: 1_000,
        trace_max: 50,
    }
}

pub fn scoring() -> RewardsScoringChecker {
    RewardsScoringChecker::new(ScoringConfig {
        min_size: Size::new(dec!(1)),
        require_top_of_book: true,
    })
}

pub fn snapshot(seq: u64, bid: (rust_decimal::Decimal, rust_decimal::Decimal), ask: (rust_decimal::Decimal, rust_decimal::Decimal)) -> MarketEvent {
    MarketEvent::Book {
        seq,
        bids: vec![(Price::new(bid.0), Size::new(bid.1))],
        asks: vec![(Price::new(ask.0), Size::new(ask.1))],
    }
}

pub fn bid_delta(seq: u64, price: rust_decimal::Decimal, size: rust_decimal::Decimal) -> MarketEvent {
    MarketEvent::PriceChange {
        seq,
        side: pmq_core::BookSide::Bid,
        price: Price::new(price),
        size: Size::new(size),
    }
}
