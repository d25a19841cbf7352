//! Resync-aware controller over the level maps.
//!
//! Behavior:
//! - Starts in resync mode until a snapshot is applied.
//! - Applies contiguous deltas while ready.
//! - On a sequence gap or a crossed book, enters resync mode and ignores
//!   further deltas until the next snapshot.
//!
//! Treating gaps and crosses as mandatory, total resyncs keeps the book's
//! validity binary: quoting against possibly-wrong state risks real loss,
//! temporarily not quoting does not.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use pmq_core::{BookLevel, BookSide, Price, Size};

use crate::levels::{BookLevels, TopLevel};

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookMode {
    Ready,
    Resync,
}

/// Recorded sequence gap: the seq we had vs. the seq we got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqGap {
    pub have: u64,
    pub got: u64,
}

/// Why the controller last entered resync mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncReason {
    /// Delta seq was not `have + 1`.
    SeqGap,
    /// A fresh snapshot itself carried a crossed book.
    CrossedBookSnapshot,
    /// A contiguous delta left the book crossed.
    CrossedBookDelta,
    /// A caller observed best bid >= best ask outside the controller.
    CrossedBookObserved,
}

impl ResyncReason {
    /// True for every crossed-book flavor.
    pub fn is_crossed(&self) -> bool {
        !matches!(self, Self::SeqGap)
    }
}

impl fmt::Display for ResyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeqGap => write!(f, "seq_gap"),
            Self::CrossedBookSnapshot => write!(f, "crossed_book_snapshot"),
            Self::CrossedBookDelta => write!(f, "crossed_book_delta"),
            Self::CrossedBookObserved => write!(f, "crossed_book_observed"),
        }
    }
}

/// What happened to a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// Level mutated, seq advanced.
    Applied,
    /// Dropped: controller was already resyncing.
    IgnoredResync,
    /// Dropped: non-contiguous seq forced resync.
    GapResync(SeqGap),
}

impl DeltaOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Resyncing order-book controller.
///
/// Lifecycle: starts in `Resync` with no seq; a snapshot transitions to
/// `Ready`; a delta with `seq == have + 1` applies and advances; anything else
/// forces `Resync` and is dropped without mutating book contents. Re-entry to
/// `Ready` happens only via a fresh snapshot.
#[derive(Debug)]
pub struct ResyncBook {
    levels: BookLevels,
    mode: BookMode,
    seq: Option<u64>,
    last_gap: Option<SeqGap>,
    last_resync_reason: Option<ResyncReason>,
}

impl Default for ResyncBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ResyncBook {
    pub fn new() -> Self {
        Self {
            levels: BookLevels::new(),
            mode: BookMode::Resync,
            seq: None,
            last_gap: None,
            last_resync_reason: None,
        }
    }

    /// Back to the initial state: empty book, resync mode, no seq.
    ///
    /// Hosts call this on reconnect so stale sequence numbers never carry
    /// across a connection.
    pub fn reset(&mut self) {
        self.levels.clear();
        self.mode = BookMode::Resync;
        self.seq = None;
        self.last_gap = None;
        self.last_resync_reason = None;
    }

    pub fn needs_resync(&self) -> bool {
        self.mode == BookMode::Resync
    }

    pub fn mode(&self) -> BookMode {
        self.mode
    }

    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    pub fn last_gap(&self) -> Option<SeqGap> {
        self.last_gap
    }

    pub fn last_resync_reason(&self) -> Option<ResyncReason> {
        self.last_resync_reason
    }

    /// Apply a full snapshot. Always transitions to ready, then re-checks for
    /// a cross: even a snapshot can be inconsistent, and we refuse to quote
    /// against a crossed book.
    pub fn apply_snapshot(&mut self, seq: u64, bids: &[BookLevel], asks: &[BookLevel]) {
        self.levels.replace_from_snapshot(bids, asks);
        self.seq = Some(seq);
        self.mode = BookMode::Ready;
        self.last_gap = None;
        self.last_resync_reason = None;
        debug!(seq, "book snapshot applied");
        self.check_cross_and_enter_resync(ResyncReason::CrossedBookSnapshot);
    }

    /// Apply a single-level delta.
    pub fn apply_delta(&mut self, seq: u64, side: BookSide, price: Price, size: Size) -> DeltaOutcome {
        if self.mode == BookMode::Resync {
            return DeltaOutcome::IgnoredResync;
        }

        // Ready mode always has a seq: only a snapshot can enter it.
        let have = self.seq.expect("ready mode must have seq");

        if seq != have + 1 {
            let gap = SeqGap { have, got: seq };
            self.mode = BookMode::Resync;
            self.last_gap = Some(gap);
            self.last_resync_reason = Some(ResyncReason::SeqGap);
            warn!(have, got = seq, "book seq gap, entering resync");
            return DeltaOutcome::GapResync(gap);
        }

        self.levels.set_level(side, price, size);
        self.seq = Some(seq);
        self.check_cross_and_enter_resync(ResyncReason::CrossedBookDelta);
        DeltaOutcome::Applied
    }

    /// Force resync mode for an externally detected integrity problem.
    pub fn enter_resync(&mut self, reason: ResyncReason) {
        self.mode = BookMode::Resync;
        self.last_gap = None;
        self.last_resync_reason = Some(reason);
        warn!(%reason, "book forced into resync");
    }

    pub fn best_bid(&self) -> Option<TopLevel> {
        self.levels.best_bid()
    }

    pub fn best_ask(&self) -> Option<TopLevel> {
        self.levels.best_ask()
    }

    fn check_cross_and_enter_resync(&mut self, reason: ResyncReason) {
        if self.levels.is_crossed() {
            self.mode = BookMode::Resync;
            self.last_gap = None;
            self.last_resync_reason = Some(reason);
            warn!(%reason, "crossed book, entering resync");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lvl(p: rust_decimal::Decimal, s: rust_decimal::Decimal) -> BookLevel {
        (Price::new(p), Size::new(s))
    }

    #[test]
    fn test_starts_in_resync() {
        let book = ResyncBook::new();
        assert!(book.needs_resync());
        assert_eq!(book.seq(), None);
        assert_eq!(book.best_bid(), None);
    }

    #[test]
    fn test_snapshot_then_contiguous_delta() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(1, &[lvl(dec!(0.49), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        assert!(!book.needs_resync());
        assert_eq!(book.seq(), Some(1));

        let out = book.apply_delta(2, BookSide::Bid, Price::new(dec!(0.50)), Size::new(dec!(80)));
        assert_eq!(out, DeltaOutcome::Applied);
        let bb = book.best_bid().unwrap();
        assert_eq!(bb.price, Price::new(dec!(0.50)));
        assert_eq!(bb.size, Size::new(dec!(80)));
    }

    #[test]
    fn test_seq_gap_forces_resync_and_leaves_book_unchanged() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(1, &[lvl(dec!(0.49), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        book.apply_delta(2, BookSide::Bid, Price::new(dec!(0.50)), Size::new(dec!(80)));

        let out = book.apply_delta(4, BookSide::Bid, Price::new(dec!(0.48)), Size::new(dec!(10)));
        assert_eq!(out, DeltaOutcome::GapResync(SeqGap { have: 2, got: 4 }));
        assert!(book.needs_resync());
        assert_eq!(book.last_gap(), Some(SeqGap { have: 2, got: 4 }));
        assert_eq!(book.last_resync_reason(), Some(ResyncReason::SeqGap));

        // Contents are untouched by the dropped delta.
        assert_eq!(book.best_bid().unwrap().price, Price::new(dec!(0.50)));
        assert_eq!(book.seq(), Some(2));
    }

    #[test]
    fn test_deltas_ignored_while_resyncing() {
        let mut book = ResyncBook::new();
        let out = book.apply_delta(1, BookSide::Bid, Price::new(dec!(0.50)), Size::new(dec!(80)));
        assert_eq!(out, DeltaOutcome::IgnoredResync);
        assert_eq!(book.best_bid(), None);
    }

    #[test]
    fn test_snapshot_reenters_ready_after_gap() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(1, &[lvl(dec!(0.49), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        book.apply_delta(5, BookSide::Bid, Price::new(dec!(0.50)), Size::new(dec!(80)));
        assert!(book.needs_resync());

        book.apply_snapshot(10, &[lvl(dec!(0.48), dec!(50))], &[lvl(dec!(0.52), dec!(50))]);
        assert!(!book.needs_resync());
        assert_eq!(book.seq(), Some(10));
        assert_eq!(book.last_gap(), None);
        assert_eq!(book.last_resync_reason(), None);
    }

    #[test]
    fn test_crossed_snapshot_enters_resync() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(1, &[lvl(dec!(0.52), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        assert!(book.needs_resync());
        assert_eq!(
            book.last_resync_reason(),
            Some(ResyncReason::CrossedBookSnapshot)
        );
        assert!(book.last_resync_reason().unwrap().is_crossed());
    }

    #[test]
    fn test_crossed_delta_enters_resync() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(1, &[lvl(dec!(0.49), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        let out = book.apply_delta(2, BookSide::Bid, Price::new(dec!(0.51)), Size::new(dec!(5)));
        assert_eq!(out, DeltaOutcome::Applied);
        assert!(book.needs_resync());
        assert_eq!(book.last_resync_reason(), Some(ResyncReason::CrossedBookDelta));
    }

    #[test]
    fn test_external_enter_resync() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(1, &[lvl(dec!(0.49), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        book.enter_resync(ResyncReason::CrossedBookObserved);
        assert!(book.needs_resync());
        assert_eq!(book.last_gap(), None);
        assert_eq!(
            book.last_resync_reason(),
            Some(ResyncReason::CrossedBookObserved)
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut book = ResyncBook::new();
        book.apply_snapshot(7, &[lvl(dec!(0.49), dec!(100))], &[lvl(dec!(0.51), dec!(100))]);
        book.reset();
        assert!(book.needs_resync());
        assert_eq!(book.seq(), None);
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_resync_reason_codes() {
        assert_eq!(ResyncReason::SeqGap.to_string(), "seq_gap");
        assert_eq!(
            ResyncReason::CrossedBookSnapshot.to_string(),
            "crossed_book_snapshot"
        );
        assert!(!ResyncReason::SeqGap.is_crossed());
        assert!(ResyncReason::CrossedBookDelta.is_crossed());
    }
}
