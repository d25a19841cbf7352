//! Deterministic runners behind the CLI.
//!
//! Every runner drives the engine against the simulated venue; there is no
//! network anywhere. Artifacts are JSON summaries plus an optional JSONL
//! journal, mirroring what a live host would emit.

use std::path::Path;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;

use pmq_core::Price;
use pmq_engine::{
    run_market_lifecycle, run_quote_loop, run_shadow_loop, LoopReport, MarketRun,
    MarketRunReport, MultiMarketReport, MultiMarketTraceEntry, RewardsScoringChecker,
    ShadowLoopConfig, ShadowReport,
};
use pmq_sim::{SimConfig, SimHandle};
use pmq_telemetry::{
    CycleOps, EconomicsLine, JournalEntry, JournalWriter, ScoringVerdicts, SideVerdict,
};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Artifact wrapper: which runner produced what, when.
#[derive(Debug, Clone, Serialize)]
pub struct RunArtifact<T> {
    pub runner: &'static str,
    pub started_at: String,
    pub markets: Vec<String>,
    pub report: T,
}

impl<T> RunArtifact<T> {
    fn new(runner: &'static str, markets: Vec<String>, report: T) -> Self {
        Self {
            runner,
            started_at: chrono::Utc::now().to_rfc3339(),
            markets,
            report,
        }
    }
}

fn venue(cfg: &AppConfig, seed_offset: u32) -> SimHandle {
    SimHandle::new(SimConfig {
        seed: cfg.run.seed.wrapping_add(seed_offset),
        tick_size: Price::new(cfg.quote.tick_size),
        mid: cfg.run.mid,
        ext_spread: cfg.run.ext_spread,
    })
}

fn write_journal(
    path: &Path,
    runner: &str,
    market: &str,
    report: &LoopReport,
) -> AppResult<()> {
    let mut writer = JournalWriter::create(path)?;
    writer.append(&JournalEntry::meta(0, runner, vec![market.to_string()]))?;
    let last_i = report.trace.last().map(|e| e.i);
    for entry in &report.trace {
        // End-of-run economics ride on the final cycle line.
        let economics = (Some(entry.i) == last_i).then(|| {
            let ledger = &report.state_final.economics;
            let mid = match (entry.best_bid, entry.best_ask) {
                (Some(bb), Some(ba)) => Some(Price::midpoint(bb.price, ba.price).inner()),
                _ => None,
            };
            EconomicsLine {
                cash: ledger.cash,
                position: ledger.position,
                pnl_mark_to_mid: mid.map(|m| ledger.cash + ledger.position * m),
                fill_count: ledger.fill_count,
            }
        });
        writer.append(&JournalEntry::Cycle {
            v: pmq_telemetry::RUN_JOURNAL_SCHEMA_VERSION,
            t: entry.now_ms,
            market: market.to_string(),
            i: entry.i,
            ops: CycleOps {
                placed: entry.placed.len() as u32,
                placed_ok: entry.placed.iter().filter(|p| p.ok).count() as u32,
                canceled: entry.canceled.len() as u32,
                cancel_ok: entry.canceled.len() as u32,
                cancel_all: entry.kill_switch.cancel_all,
            },
            scoring: Some(ScoringVerdicts {
                buy: SideVerdict {
                    scoring: entry.scoring.buy.scoring,
                    reason: entry.scoring.buy.reason.to_string(),
                },
                sell: SideVerdict {
                    scoring: entry.scoring.sell.scoring,
                    reason: entry.scoring.sell.reason.to_string(),
                },
            }),
            economics,
        })?;
    }
    Ok(())
}

/// Single-market replay run.
pub fn run_replay(cfg: &AppConfig, journal: Option<&Path>) -> AppResult<RunArtifact<LoopReport>> {
    let market = &cfg.run.markets[0];
    info!(market = %market, steps = cfg.run.steps, "starting replay run");

    let sim = venue(cfg, 0);
    let mut feed = sim.feed();
    let mut executor = sim.executor();
    let scoring = RewardsScoringChecker::new(cfg.scoring_config());

    let report = run_quote_loop(&cfg.loop_config(market), &mut feed, &mut executor, &scoring)?;

    if let Some(path) = journal {
        write_journal(path, "replay", market, &report)?;
    }
    Ok(RunArtifact::new("replay", vec![market.clone()], report))
}

/// Multi-market run: one tokio task per market, fully disjoint state.
pub async fn run_multi(cfg: &AppConfig) -> AppResult<RunArtifact<MultiMarketReport>> {
    info!(markets = cfg.run.markets.len(), "starting multi-market run");

    let mut set: JoinSet<Result<(usize, String, LoopReport), pmq_engine::EngineError>> =
        JoinSet::new();

    for (index, market) in cfg.run.markets.iter().enumerate() {
        let market = market.clone();
        let loop_cfg = cfg.loop_config(&market);
        let sim = venue(cfg, index as u32);
        let scoring = RewardsScoringChecker::new(cfg.scoring_config());

        set.spawn_blocking(move || {
            let mut feed = sim.feed();
            let mut executor = sim.executor();
            let report = run_quote_loop(&loop_cfg, &mut feed, &mut executor, &scoring)?;
            Ok((index, market, report))
        });
    }

    let mut results: Vec<Option<(String, LoopReport)>> = Vec::new();
    results.resize_with(cfg.run.markets.len(), || None);
    while let Some(joined) = set.join_next().await {
        let (index, market, report) = joined??;
        results[index] = Some((market, report));
    }

    let mut per_market = Vec::with_capacity(results.len());
    let mut trace = Vec::new();
    for slot in results {
        let (market, report) = slot.expect("every spawned market reports once");
        let market_id = pmq_core::MarketId::new(market);
        for entry in &report.trace {
            trace.push(MultiMarketTraceEntry {
                market: market_id.clone(),
                entry: entry.clone(),
            });
        }
        per_market.push(MarketRunReport {
            market: market_id,
            churn: report.churn,
            scoring_totals: report.scoring.totals,
            state_final: report.state_final,
            outcome: report.outcome,
        });
    }

    Ok(RunArtifact::new(
        "multi",
        cfg.run.markets.clone(),
        MultiMarketReport { per_market, trace },
    ))
}

/// Sequential lifecycle run over the first two configured markets.
pub fn run_lifecycle(
    cfg: &AppConfig,
) -> AppResult<RunArtifact<pmq_engine::LifecycleReport>> {
    if cfg.run.markets.len() < 2 {
        return Err(AppError::InvalidConfig(
            "lifecycle runner needs two markets in run.markets".into(),
        ));
    }
    let (market_a, market_b) = (&cfg.run.markets[0], &cfg.run.markets[1]);
    info!(a = %market_a, b = %market_b, "starting lifecycle run");

    let sim_a = venue(cfg, 0);
    let sim_b = venue(cfg, 1);
    let observe_a = sim_a.clone();
    let observe_b = sim_b.clone();

    let report = run_market_lifecycle(
        MarketRun {
            cfg: cfg.loop_config(market_a),
            feed: sim_a.feed(),
            executor: sim_a.executor(),
            scoring: RewardsScoringChecker::new(cfg.scoring_config()),
        },
        MarketRun {
            cfg: cfg.loop_config(market_b),
            feed: sim_b.feed(),
            executor: sim_b.executor(),
            scoring: RewardsScoringChecker::new(cfg.scoring_config()),
        },
        |phase| {
            serde_json::json!({
                "phase": phase,
                "open_orders_a": observe_a.open_orders(),
                "open_orders_b": observe_b.open_orders(),
            })
        },
    )?;

    // The exit boundary must leave market A flat at the venue.
    debug_assert_eq!(observe_a.open_orders(), 0);

    Ok(RunArtifact::new(
        "lifecycle",
        vec![market_a.clone(), market_b.clone()],
        report,
    ))
}

/// Read-only shadow run: same ingestion, no order actions.
pub fn run_shadow(cfg: &AppConfig) -> AppResult<RunArtifact<ShadowReport>> {
    let market = &cfg.run.markets[0];
    info!(market = %market, steps = cfg.run.steps, "starting shadow run");

    let sim = venue(cfg, 0);
    let mut feed = sim.feed();
    let loop_cfg = cfg.loop_config(market);

    let report = run_shadow_loop(
        &ShadowLoopConfig {
            market: loop_cfg.engine.market.clone(),
            quote: loop_cfg.engine.quote.clone(),
            kill_switch: loop_cfg.engine.kill_switch,
            steps: loop_cfg.steps,
            active_market_steps: loop_cfg.active_market_steps,
            step_ms: loop_cfg.step_ms,
            trace_max: loop_cfg.trace_max,
        },
        &mut feed,
    )?;

    // Shadow must never have touched the venue.
    debug_assert_eq!(sim.open_orders(), 0);

    Ok(RunArtifact::new("shadow", vec![market.clone()], report))
}
