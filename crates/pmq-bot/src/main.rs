//! PMQ host entry point.
//!
//! Deterministic runners over the simulated venue: replay, multi-market,
//! lifecycle, and shadow. Artifacts land as JSON (plus an optional JSONL
//! journal for replay runs).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use pmq_bot::AppConfig;

/// PMQ market-making engine host
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PMQ_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Summary artifact path (defaults to artifacts/<runner>.json)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Optional JSONL journal path (replay runner only)
    #[arg(long)]
    journal: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Single-market deterministic replay
    Replay,
    /// One loop per configured market, concurrently, with disjoint state
    Multi,
    /// Run market A, exit flat, then run market B fresh
    Lifecycle,
    /// Read-only shadow run (no order actions)
    Shadow,
}

fn write_artifact<T: Serialize>(path: &PathBuf, artifact: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    // Write-then-rename so a crash never leaves a truncated artifact.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(artifact)? + "\n")?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), "artifact written");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pmq_telemetry::init_logging()?;
    info!("Starting pmq-bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("PMQ_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());
    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::from_file(&config_path)?;

    let runner = match &args.command {
        Command::Replay => "replay",
        Command::Multi => "multi",
        Command::Lifecycle => "lifecycle",
        Command::Shadow => "shadow",
    };
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("artifacts/{runner}.json")));

    match args.command {
        Command::Replay => {
            let artifact = pmq_bot::run_replay(&config, args.journal.as_deref())?;
            write_artifact(&out, &artifact)?;
        }
        Command::Multi => {
            let artifact = pmq_bot::run_multi(&config).await?;
            write_artifact(&out, &artifact)?;
        }
        Command::Lifecycle => {
            let artifact = pmq_bot::run_lifecycle(&config)?;
            write_artifact(&out, &artifact)?;
        }
        Command::Shadow => {
            let artifact = pmq_bot::run_shadow(&config)?;
            write_artifact(&out, &artifact)?;
        }
    }

    Ok(())
}
