//! Append-only run journal.
//!
//! One JSON object per line: a `meta` line at the start of a run, then one
//! `cycle` line per market per cycle. Entries never contain secrets; they are
//! safe to ship as artifacts.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TelemetryResult;

pub const RUN_JOURNAL_SCHEMA_VERSION: u32 = 1;

/// Outbound-action counts for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOps {
    pub placed: u32,
    pub placed_ok: u32,
    pub canceled: u32,
    pub cancel_ok: u32,
    pub cancel_all: bool,
}

/// One side's scoring verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideVerdict {
    pub scoring: bool,
    pub reason: String,
}

/// Both sides' scoring verdicts for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringVerdicts {
    pub buy: SideVerdict,
    pub sell: SideVerdict,
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    Meta {
        v: u32,
        t: u64,
        runner: String,
        markets: Vec<String>,
    },
    Cycle {
        v: u32,
        t: u64,
        market: String,
        i: u32,
        ops: CycleOps,
        #[serde(skip_serializing_if = "Option::is_none")]
        scoring: Option<ScoringVerdicts>,
        #[serde(skip_serializing_if = "Option::is_none")]
        economics: Option<EconomicsLine>,
    },
}

/// Economics summary attached to a cycle line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicsLine {
    pub cash: Decimal,
    pub position: Decimal,
    pub pnl_mark_to_mid: Option<Decimal>,
    pub fill_count: u64,
}

impl JournalEntry {
    pub fn meta(t: u64, runner: impl Into<String>, markets: Vec<String>) -> Self {
        Self::Meta {
            v: RUN_JOURNAL_SCHEMA_VERSION,
            t,
            runner: runner.into(),
            markets,
        }
    }
}

/// Line-buffered JSONL appender.
pub struct JournalWriter {
    file: File,
}

impl JournalWriter {
    /// Create (truncating) a fresh journal for this run.
    pub fn create(path: &Path) -> TelemetryResult<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self { file })
    }

    /// Append one entry as a single JSON line.
    pub fn append(&mut self, entry: &JournalEntry) -> TelemetryResult<()> {
        let line = serde_json::to_string(entry)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_line_shape() {
        let entry = JournalEntry::meta(0, "replay", vec!["mkt_a".into()]);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "meta");
        assert_eq!(json["v"], 1);
        assert_eq!(json["runner"], "replay");
    }

    #[test]
    fn test_cycle_line_omits_empty_sections() {
        let entry = JournalEntry::Cycle {
            v: RUN_JOURNAL_SCHEMA_VERSION,
            t: 1_000,
            market: "mkt_a".into(),
            i: 1,
            ops: CycleOps::default(),
            scoring: None,
            economics: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("scoring"));
        assert!(!json.contains("economics"));
    }

    #[test]
    fn test_roundtrip() {
        let entry = JournalEntry::Cycle {
            v: RUN_JOURNAL_SCHEMA_VERSION,
            t: 2_000,
            market: "mkt_a".into(),
            i: 2,
            ops: CycleOps {
                placed: 2,
                placed_ok: 2,
                canceled: 1,
                cancel_ok: 1,
                cancel_all: false,
            },
            scoring: Some(ScoringVerdicts {
                buy: SideVerdict {
                    scoring: true,
                    reason: "ok".into(),
                },
                sell: SideVerdict {
                    scoring: false,
                    reason: "not_top_of_book".into(),
                },
            }),
            economics: None,
        };
        let line = serde_json::to_string(&entry).unwrap();
        let back: JournalEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back, entry);
    }
}
