//! Exact fit resolution: the sequence-ordered greedy pass.
//!
//! Resolution order is `sequence`, not priority — earlier-sequence pieces
//! get first claim on the remaining budget. Ties fall back to input order.

use crate::candidate::Candidate;
use crate::truncate::shrink_to_fit;
use promptloom_core::{
    DropReason, DroppedPiece, FallbackUsage, RenderError, TokenCounter,
};
use tracing::{debug, trace};

/// What the greedy pass produced.
#[derive(Debug)]
pub(crate) struct FitOutcome {
    /// Candidates that fit, in resolution (sequence) order.
    pub included: Vec<Candidate>,
    pub dropped: Vec<DroppedPiece>,
    pub fallback_usages: Vec<FallbackUsage>,
}

/// Decide, per candidate, whether to use the primary content, a fallback,
/// a truncated form, or to drop it — tracking the exact remaining budget.
///
/// # Errors
///
/// [`RenderError::Oversized`] when a fail-fast piece with non-empty
/// content fits in no form. Fatal: the whole render is abandoned.
pub(crate) fn resolve_fit(
    mut candidates: Vec<Candidate>,
    budget: usize,
    counter: &dyn TokenCounter,
) -> Result<FitOutcome, RenderError> {
    candidates.sort_by_key(|c| (c.piece.sequence, c.index));

    let mut remaining = budget;
    let mut included = Vec::with_capacity(candidates.len());
    let mut dropped = Vec::new();
    let mut fallback_usages = Vec::new();

    for mut cand in candidates {
        // Primary fits as-is.
        if cand.cost <= remaining {
            remaining -= cand.cost;
            included.push(cand);
            continue;
        }

        // Section-resolved atoms are all-or-nothing.
        if cand.fixed {
            trace!(sequence = cand.piece.sequence, cost = cand.cost, "section atom dropped");
            dropped.push(DroppedPiece {
                piece: cand.original_piece().clone(),
                reason: DropReason::BudgetExhausted,
            });
            continue;
        }

        // First fallback that fits wins.
        if let Some((index, content, cost)) = pick_fallback(&cand, remaining, counter) {
            trace!(sequence = cand.piece.sequence, index, cost, "fallback substituted");
            fallback_usages.push(FallbackUsage {
                piece: cand.piece.clone(),
                fallback_index: index,
            });
            cand.substitute(content, cost);
            remaining -= cost;
            included.push(cand);
            continue;
        }

        // Nothing listed fits: the overflow policy decides.
        if !cand.piece.overflow.truncates() {
            if cand.piece.is_reservation() {
                // A reservation that does not fit reserves nothing.
                dropped.push(DroppedPiece {
                    piece: cand.original_piece().clone(),
                    reason: DropReason::EmptyReservation,
                });
                continue;
            }
            return Err(RenderError::Oversized {
                piece: Box::new(cand.original_piece().clone()),
                remaining,
            });
        }

        let overhead = counter.overhead();
        if remaining < overhead {
            dropped.push(DroppedPiece {
                piece: cand.original_piece().clone(),
                reason: DropReason::OverheadExceedsBudget,
            });
            continue;
        }

        let (content, measured) =
            shrink_to_fit(&cand.piece.content, remaining - overhead, cand.piece.overflow, counter);
        if content.is_empty() && !cand.piece.content.is_empty() {
            // Shrunk to nothing: an empty remnant carries no value.
            dropped.push(DroppedPiece {
                piece: cand.original_piece().clone(),
                reason: DropReason::BudgetExhausted,
            });
            continue;
        }

        let cost = measured + overhead;
        debug!(
            sequence = cand.piece.sequence,
            from = cand.cost,
            to = cost,
            "piece truncated to fit"
        );
        cand.substitute(content, cost);
        remaining -= cost;
        included.push(cand);
    }

    Ok(FitOutcome {
        included,
        dropped,
        fallback_usages,
    })
}

/// The first fallback whose measured cost fits `remaining`, if any.
fn pick_fallback(
    cand: &Candidate,
    remaining: usize,
    counter: &dyn TokenCounter,
) -> Option<(usize, String, usize)> {
    cand.piece.fallbacks.iter().enumerate().find_map(|(i, f)| {
        let cost = counter.count(f) + counter.overhead();
        (cost <= remaining).then(|| (i, f.clone(), cost))
    })
}
