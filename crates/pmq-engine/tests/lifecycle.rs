//! Sequential lifecycle: run A, exit, reset, run B.

mod common;

use rust_decimal_macros::dec;
use serde_json::json;

use pmq_core::Price;
use pmq_engine::{run_market_lifecycle, LifecyclePhase, MarketRun};
use pmq_sim::{SimConfig, SimHandle};

use common::{loop_cfg, scoring, snapshot, ScriptedFeed};

fn venue(seed: u32) -> SimHandle {
    SimHandle::new(SimConfig {
        seed,
        tick_size: Price::new(dec!(0.01)),
        mid: 0.5,
        ext_spread: 0.10,
    })
}

#[test]
fn lifecycle_exits_flat_and_runs_b_fresh() {
    let sim_a = venue(7);
    let sim_b = venue(23);

    let a = MarketRun {
        cfg: loop_cfg("mkt_a", 2, 2),
        feed: ScriptedFeed::new(
            sim_a.feed(),
            vec![
                vec![snapshot(1, (dec!(0.50), dec!(15)), (dec!(0.52), dec!(25)))],
                vec![],
            ],
        ),
        executor: sim_a.executor(),
        scoring: scoring(),
    };
    let b = MarketRun {
        cfg: loop_cfg("mkt_b", 2, 2),
        feed: ScriptedFeed::new(
            sim_b.feed(),
            vec![
                vec![snapshot(1, (dec!(0.40), dec!(10)), (dec!(0.44), dec!(10)))],
                vec![],
            ],
        ),
        executor: sim_b.executor(),
        scoring: scoring(),
    };

    let sim_a_observe = sim_a.clone();
    let report = run_market_lifecycle(a, b, |phase| match phase {
        LifecyclePhase::AfterA | LifecyclePhase::AfterExit => {
            json!({ "open_orders_a": sim_a_observe.open_orders() })
        }
        _ => serde_json::Value::Null,
    })
    .unwrap();

    // A quoted both sides and they were still resting at the end of A.
    assert_eq!(report.a.state_final.live_orders.len(), 2);
    assert_eq!(report.snapshots["after_a"]["open_orders_a"], 2);

    // Exit swept market A at the venue.
    assert!(report.exit.ok);
    assert_eq!(report.exit.canceled, 2);
    assert_eq!(report.snapshots["after_exit"]["open_orders_a"], 0);

    // B ran from completely fresh state: its own book, its own quotes.
    assert_eq!(report.b.state_final.live_orders.len(), 2);
    let b_buy = &report.b.state_final.live_orders[0];
    assert_eq!(b_buy.price, Price::new(dec!(0.40)));
    assert_eq!(report.b.churn.cancel_all_calls, 0);
    assert_eq!(report.b.state_final.position.position, dec!(0));

    // All four phase snapshots were recorded.
    for phase in ["after_a", "after_exit", "after_reset", "after_b"] {
        assert!(report.snapshots.contains_key(phase), "missing {phase}");
    }
}
