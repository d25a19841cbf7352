//! The simulated venue and its feed/executor facades.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use pmq_core::{
    CancelAllOutcome, CancelOutcome, ExecutionClient, FixtureFeed, IdGenerator, MarketEvent,
    OrderId, OrderSide, PlaceOrderRequest, PlaceOutcome, Price, Size, UserEvent,
};

use crate::rng::Mulberry32;

/// Simulator parameters.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u32,
    pub tick_size: Price,
    /// Starting external midpoint.
    pub mid: f64,
    /// External top-of-book spread around the midpoint.
    pub ext_spread: f64,
}

#[derive(Debug, Clone)]
struct SimOrder {
    id: OrderId,
    side: OrderSide,
    price: Price,
    size: Size,
}

/// Deterministic exchange simulator.
///
/// Each `step` walks the external midpoint, emits one book snapshot, and
/// fills any resting order the external top of book has crossed.
pub struct SimExchange {
    tick: Decimal,
    tick_f64: f64,
    ext_spread: f64,
    mid: f64,
    rng: Mulberry32,
    ids: IdGenerator,
    /// Insertion-ordered so fill events replay identically.
    orders: Vec<SimOrder>,
    position: Decimal,
    seq: u64,
    market_events: VecDeque<MarketEvent>,
    user_events: VecDeque<UserEvent>,
}

impl SimExchange {
    pub fn new(cfg: SimConfig) -> Self {
        let tick = cfg.tick_size.inner();
        Self {
            tick,
            tick_f64: tick.to_f64().expect("tick size fits in f64"),
            ext_spread: cfg.ext_spread,
            mid: cfg.mid,
            rng: Mulberry32::new(cfg.seed),
            ids: IdGenerator::new("sim_order"),
            orders: Vec::new(),
            position: Decimal::ZERO,
            seq: 0,
            market_events: VecDeque::new(),
            user_events: VecDeque::new(),
        }
    }

    fn bid_on_grid(&self) -> Price {
        let ticks = ((self.mid - self.ext_spread / 2.0) / self.tick_f64).floor() as i64;
        Price::new(Decimal::from(ticks) * self.tick)
    }

    fn ask_on_grid(&self) -> Price {
        let ticks = ((self.mid + self.ext_spread / 2.0) / self.tick_f64).ceil() as i64;
        Price::new(Decimal::from(ticks) * self.tick)
    }

    /// Advance one step: walk the mid, emit a snapshot, fill crossed orders.
    pub fn step(&mut self) {
        let u = self.rng.next_f64() - 0.5;
        let step_size = self.tick_f64 * 2.0;
        self.mid = (self.mid + u * step_size).max(0.01);

        let best_bid = self.bid_on_grid();
        let best_ask = self.ask_on_grid();
        self.seq += 1;

        self.market_events.push_back(MarketEvent::Book {
            seq: self.seq,
            bids: vec![(best_bid, Size::new(Decimal::from(1_000)))],
            asks: vec![(best_ask, Size::new(Decimal::from(1_000)))],
        });

        // Fill any orders that became crossing vs the external top of book.
        let mut remaining = Vec::with_capacity(self.orders.len());
        for order in std::mem::take(&mut self.orders) {
            let crossed = match order.side {
                OrderSide::Buy => order.price >= best_ask,
                OrderSide::Sell => order.price <= best_bid,
            };
            if !crossed {
                remaining.push(order);
                continue;
            }
            let fill_price = match order.side {
                OrderSide::Buy => best_ask,
                OrderSide::Sell => best_bid,
            };
            match order.side {
                OrderSide::Buy => self.position += order.size.inner(),
                OrderSide::Sell => self.position -= order.size.inner(),
            }
            trace!(id = %order.id, side = %order.side, price = %fill_price, "sim fill");
            self.user_events.push_back(UserEvent::Fill {
                order_id: order.id.clone(),
                side: order.side,
                price: fill_price,
                size: order.size,
            });
            self.user_events.push_back(UserEvent::OrderClosed {
                order_id: order.id,
            });
        }
        self.orders = remaining;
    }

    pub fn place_order(&mut self, side: OrderSide, price: Price, size: Size) -> OrderId {
        let id = self.ids.next_id();
        self.orders.push(SimOrder {
            id: id.clone(),
            side,
            price,
            size,
        });
        self.user_events.push_back(UserEvent::OrderOpen {
            order_id: id.clone(),
            side,
            price,
            size,
        });
        id
    }

    pub fn cancel_order(&mut self, id: &OrderId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != *id);
        if self.orders.len() == before {
            return false;
        }
        self.user_events.push_back(UserEvent::OrderCanceled {
            order_id: id.clone(),
        });
        true
    }

    pub fn cancel_all(&mut self) -> u32 {
        let ids: Vec<OrderId> = self.orders.iter().map(|o| o.id.clone()).collect();
        for id in &ids {
            self.cancel_order(id);
        }
        ids.len() as u32
    }

    pub fn top_of_book(&self) -> (Price, Price) {
        (self.bid_on_grid(), self.ask_on_grid())
    }

    pub fn position(&self) -> Decimal {
        self.position
    }

    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn drain_market(&mut self) -> Vec<MarketEvent> {
        self.market_events.drain(..).collect()
    }

    pub fn drain_user(&mut self) -> Vec<UserEvent> {
        self.user_events.drain(..).collect()
    }
}

/// Shared handle to one simulated venue.
///
/// The feed and executor facades borrow the same underlying exchange, the
/// way a venue's market channel and trading API describe one book.
#[derive(Clone)]
pub struct SimHandle {
    inner: Arc<Mutex<SimExchange>>,
}

impl SimHandle {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimExchange::new(cfg))),
        }
    }

    pub fn feed(&self) -> SimFeed {
        SimFeed {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn executor(&self) -> SimExecutor {
        SimExecutor {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn position(&self) -> Decimal {
        self.inner.lock().position()
    }

    pub fn open_orders(&self) -> usize {
        self.inner.lock().open_orders()
    }

    pub fn top_of_book(&self) -> (Price, Price) {
        self.inner.lock().top_of_book()
    }
}

/// Feed facade: the injected event source.
pub struct SimFeed {
    inner: Arc<Mutex<SimExchange>>,
}

impl FixtureFeed for SimFeed {
    fn step_market(&mut self) {
        self.inner.lock().step();
    }

    fn drain_market(&mut self) -> Vec<MarketEvent> {
        self.inner.lock().drain_market()
    }

    fn drain_user(&mut self) -> Vec<UserEvent> {
        self.inner.lock().drain_user()
    }
}

/// Executor facade: the injected execution boundary.
pub struct SimExecutor {
    inner: Arc<Mutex<SimExchange>>,
}

impl ExecutionClient for SimExecutor {
    fn place_order(&mut self, req: &PlaceOrderRequest) -> PlaceOutcome {
        if !req.size.is_positive() {
            return PlaceOutcome::rejected("non_positive_size");
        }
        let id = self.inner.lock().place_order(req.side, req.price, req.size);
        PlaceOutcome::accepted(id)
    }

    fn cancel_order(&mut self, id: &OrderId) -> CancelOutcome {
        if self.inner.lock().cancel_order(id) {
            CancelOutcome::accepted()
        } else {
            CancelOutcome::rejected("unknown_order")
        }
    }

    fn cancel_all(&mut self) -> CancelAllOutcome {
        let canceled = self.inner.lock().cancel_all();
        CancelAllOutcome {
            ok: true,
            reason: None,
            canceled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sim() -> SimExchange {
        SimExchange::new(SimConfig {
            seed: 999,
            tick_size: Price::new(dec!(0.01)),
            mid: 0.5,
            ext_spread: 0.10,
        })
    }

    #[test]
    fn test_step_emits_snapshot_with_increasing_seq() {
        let mut ex = sim();
        ex.step();
        ex.step();
        let events = ex.drain_market();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq(), 1);
        assert_eq!(events[1].seq(), 2);
        let MarketEvent::Book { bids, asks, .. } = &events[0] else {
            panic!("expected snapshot");
        };
        assert_eq!(bids.len(), 1);
        assert_eq!(asks.len(), 1);
        assert!(bids[0].0 < asks[0].0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = sim();
        let mut b = sim();
        for _ in 0..20 {
            a.step();
            b.step();
        }
        assert_eq!(a.drain_market(), b.drain_market());
    }

    #[test]
    fn test_place_emits_open_and_cancel_emits_canceled() {
        let mut ex = sim();
        let id = ex.place_order(OrderSide::Buy, Price::new(dec!(0.40)), Size::new(dec!(1)));
        assert!(ex.cancel_order(&id));
        assert!(!ex.cancel_order(&id));

        let events = ex.drain_user();
        assert!(matches!(events[0], UserEvent::OrderOpen { .. }));
        assert!(matches!(events[1], UserEvent::OrderCanceled { .. }));
    }

    #[test]
    fn test_crossing_buy_fills_and_closes() {
        let mut ex = sim();
        // A buy far above any plausible ask must fill on the next step.
        ex.place_order(OrderSide::Buy, Price::new(dec!(0.99)), Size::new(dec!(2)));
        ex.drain_user();
        ex.step();

        let events = ex.drain_user();
        assert_eq!(events.len(), 2);
        let UserEvent::Fill { side, size, .. } = &events[0] else {
            panic!("expected fill");
        };
        assert_eq!(*side, OrderSide::Buy);
        assert_eq!(*size, Size::new(dec!(2)));
        assert!(matches!(events[1], UserEvent::OrderClosed { .. }));
        assert_eq!(ex.position(), dec!(2));
        assert_eq!(ex.open_orders(), 0);
    }

    #[test]
    fn test_resting_order_away_from_market_survives() {
        let mut ex = sim();
        ex.place_order(OrderSide::Buy, Price::new(dec!(0.01)), Size::new(dec!(1)));
        ex.step();
        assert_eq!(ex.open_orders(), 1);
        assert_eq!(ex.position(), dec!(0));
    }

    #[test]
    fn test_cancel_all_sweeps_everything() {
        let mut ex = sim();
        ex.place_order(OrderSide::Buy, Price::new(dec!(0.10)), Size::new(dec!(1)));
        ex.place_order(OrderSide::Sell, Price::new(dec!(0.90)), Size::new(dec!(1)));
        assert_eq!(ex.cancel_all(), 2);
        assert_eq!(ex.open_orders(), 0);
    }
}
