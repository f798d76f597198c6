//! Threshold search: the lowest priority level whose optimistic inclusion
//! cost fits the budget.
//!
//! The estimate is deliberately optimistic — truncating pieces are assumed
//! to shrink to their structural overhead, fail-fast pieces to their
//! cheapest variant — so the threshold is never too conservative. The exact
//! fit pass afterwards may still drop pieces at or above the threshold;
//! that is expected, not a defect. An exact threshold would require
//! searching the full fallback/truncation space.

use crate::candidate::Candidate;
use promptloom_core::{Priority, TokenCounter};

/// Outcome of the threshold search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThresholdDecision {
    /// Admit pieces at or above this finite level, plus always-keep pieces.
    AtLeast(i64),
    /// Not even the highest finite level fit: admit only always-keep
    /// pieces. `sentinel` is one above the highest level present
    /// (saturating), reported as the threshold value.
    OnlyAlways { sentinel: i64 },
}

impl ThresholdDecision {
    /// Whether a piece of this priority survives the threshold.
    pub(crate) fn admits(self, priority: Priority) -> bool {
        match self {
            Self::AtLeast(level) => priority.clears(level),
            Self::OnlyAlways { .. } => priority == Priority::Always,
        }
    }

    /// The threshold level for reporting.
    pub(crate) fn level(self) -> i64 {
        match self {
            Self::AtLeast(level) => level,
            Self::OnlyAlways { sentinel } => sentinel,
        }
    }
}

/// Find the lowest finite priority level whose optimistic cost sum fits
/// `budget`. With no finite levels at all the decision is the trivial
/// `AtLeast(0)`.
pub(crate) fn find_threshold(
    candidates: &[Candidate],
    budget: usize,
    counter: &dyn TokenCounter,
) -> ThresholdDecision {
    let mut levels: Vec<i64> = candidates
        .iter()
        .filter_map(|c| c.piece.priority.finite())
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let Some(&max_level) = levels.last() else {
        // Only always-keep pieces (or none): nothing to exclude by level.
        return ThresholdDecision::AtLeast(0);
    };

    // Lower-bound binary search: leftmost level whose optimistic cost sum
    // fits. Cost is monotonically non-increasing as the level rises. The
    // virtual index one past the end stands for "exclude everything
    // finite" and is accepted unconditionally, so the search always has a
    // valid answer.
    let mut lo = 0usize;
    let mut hi = levels.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if fits(candidates, levels[mid], budget, counter) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    if lo == levels.len() {
        ThresholdDecision::OnlyAlways {
            sentinel: max_level.saturating_add(1),
        }
    } else {
        ThresholdDecision::AtLeast(levels[lo])
    }
}

/// Sum of optimistic minimum costs of candidates at or above `level`,
/// compared against the budget. Bails out early once the sum exceeds it.
fn fits(candidates: &[Candidate], level: i64, budget: usize, counter: &dyn TokenCounter) -> bool {
    let mut sum = 0usize;
    for cand in candidates {
        if !cand.piece.priority.clears(level) {
            continue;
        }
        sum = sum.saturating_add(optimistic_min(cand, counter));
        if sum > budget {
            return false;
        }
    }
    true
}

/// Best-case cost of a candidate: what it would consume if every
/// degradation option broke its way.
fn optimistic_min(cand: &Candidate, counter: &dyn TokenCounter) -> usize {
    if cand.fixed {
        // Section-resolved atoms are all-or-nothing at their final cost.
        return cand.cost;
    }
    if cand.piece.overflow.truncates() {
        // Can theoretically shrink to near-empty.
        return counter.overhead();
    }
    cand.piece
        .fallbacks
        .iter()
        .map(|f| counter.count(f) + counter.overhead())
        .fold(cand.cost, usize::min)
}
