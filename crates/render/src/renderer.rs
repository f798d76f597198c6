//! The render pipeline entry point.
//!
//! Two-phase sizing: an optimistic threshold search decides *which*
//! priorities survive, then an exact sequence-ordered greedy pass decides
//! *what form* each survivor takes (primary, fallback, truncated) while
//! tracking the remaining budget precisely.

use crate::assemble::assemble;
use crate::candidate::Candidate;
use crate::resolver::resolve_fit;
use crate::sections::collapse_sections;
use crate::threshold::find_threshold;
use promptloom_core::{
    DropReason, DroppedPiece, Piece, RenderError, RenderResult, Section, TokenCounter,
};
use std::collections::BTreeMap;
use tracing::debug;

/// The renderer. Stateless between calls — create one and reuse it.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    budget: usize,
    sections: BTreeMap<String, Section>,
}

impl PromptRenderer {
    /// Create a renderer with the given total budget.
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            sections: BTreeMap::new(),
        }
    }

    /// Declare a named sub-budget. Re-declaring a name replaces it.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.insert(section.name.clone(), section);
        self
    }

    /// Declare several sub-budgets at once.
    pub fn with_sections(mut self, sections: impl IntoIterator<Item = Section>) -> Self {
        for section in sections {
            self.sections.insert(section.name.clone(), section);
        }
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Render the pieces into a budget-compliant result.
    ///
    /// Takes an immutable snapshot of its inputs: the caller's pieces are
    /// never mutated, and nothing persists between calls. Conditions and
    /// the size oracle are the only points where control leaves the
    /// pipeline.
    ///
    /// # Errors
    ///
    /// [`RenderError::Oversized`] when a fail-fast piece with non-empty
    /// content fits in no form; no partial result is returned.
    pub fn render(
        &self,
        pieces: &[Piece],
        counter: &dyn TokenCounter,
    ) -> Result<RenderResult, RenderError> {
        // Condition filter: predicates run once, at render time.
        let mut condition_excluded = Vec::new();
        let mut candidates = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.iter().enumerate() {
            if let Some(condition) = &piece.condition {
                if !condition.evaluate() {
                    condition_excluded.push(piece.clone());
                    continue;
                }
            }
            // Cost annotation: caller-supplied costs verbatim, the rest
            // measured now.
            candidates.push(Candidate::annotate(piece, index, counter));
        }
        if !condition_excluded.is_empty() {
            debug!(excluded = condition_excluded.len(), "conditions filtered pieces");
        }

        // Named sub-budgets resolve first; winners rejoin as fixed atoms.
        let sections = collapse_sections(candidates, &self.sections, counter)?;
        let mut dropped = sections.dropped;
        let mut fallback_usages = sections.fallback_usages;

        // Optimistic threshold over the merged pool.
        let threshold = find_threshold(&sections.pool, self.budget, counter);
        debug!(threshold = threshold.level(), budget = self.budget, "threshold converged");

        let (surviving, below): (Vec<_>, Vec<_>) = sections
            .pool
            .into_iter()
            .partition(|c| threshold.admits(c.piece.priority));
        dropped.extend(below.into_iter().map(|c| DroppedPiece {
            piece: c.original_piece().clone(),
            reason: DropReason::BelowThreshold,
        }));

        // Exact greedy pass.
        let outcome = resolve_fit(surviving, self.budget, counter)?;
        dropped.extend(outcome.dropped);
        fallback_usages.extend(outcome.fallback_usages);

        let result = assemble(
            self.budget,
            threshold.level(),
            outcome.included,
            dropped,
            condition_excluded,
            fallback_usages,
        );
        debug!(
            included = result.included.len(),
            dropped = result.dropped.len(),
            total_cost = result.total_cost,
            "render complete"
        );
        Ok(result)
    }
}
