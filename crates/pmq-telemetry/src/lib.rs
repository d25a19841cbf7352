//! Structured logging and run-journal records for PMQ.

pub mod error;
pub mod journal;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use journal::{
    CycleOps, EconomicsLine, JournalEntry, JournalWriter, ScoringVerdicts, SideVerdict,
    RUN_JOURNAL_SCHEMA_VERSION,
};
pub use logging::init_logging;
