//! Section sub-rendering: named sub-budgets resolved before the main pass.

use crate::candidate::Candidate;
use crate::resolver::resolve_fit;
use crate::threshold::find_threshold;
use promptloom_core::{
    DropReason, DroppedPiece, FallbackUsage, RenderError, Section, TokenCounter,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of collapsing every declared section into the main pool.
pub(crate) struct SectionsOutcome {
    /// Main-pool candidates: unsectioned pieces plus section winners as
    /// fixed-cost atoms.
    pub pool: Vec<Candidate>,
    pub dropped: Vec<DroppedPiece>,
    pub fallback_usages: Vec<FallbackUsage>,
}

/// Run the threshold + fit pipeline independently per declared section.
///
/// Winners rejoin the main pool with their resolved cost fixed: the main
/// pass may still drop them, but never re-truncates or re-substitutes.
/// Pieces referencing an undeclared section name stay ordinary main-pool
/// pieces.
pub(crate) fn collapse_sections(
    candidates: Vec<Candidate>,
    sections: &BTreeMap<String, Section>,
    counter: &dyn TokenCounter,
) -> Result<SectionsOutcome, RenderError> {
    let mut pool = Vec::with_capacity(candidates.len());
    let mut grouped: BTreeMap<&str, Vec<Candidate>> = BTreeMap::new();

    for cand in candidates {
        let declared = cand
            .piece
            .section
            .as_deref()
            .and_then(|name| sections.get(name))
            .map(|section| section.name.as_str());
        match declared {
            Some(name) => grouped.entry(name).or_default().push(cand),
            None => pool.push(cand),
        }
    }

    let mut dropped = Vec::new();
    let mut fallback_usages = Vec::new();

    for (name, group) in grouped {
        let section = &sections[name];
        let threshold = find_threshold(&group, section.max_cost, counter);

        let (surviving, below): (Vec<_>, Vec<_>) = group
            .into_iter()
            .partition(|c| threshold.admits(c.piece.priority));
        dropped.extend(below.into_iter().map(|c| DroppedPiece {
            piece: c.original_piece().clone(),
            reason: DropReason::BelowThreshold,
        }));

        let outcome = resolve_fit(surviving, section.max_cost, counter)?;
        debug!(
            section = %name,
            threshold = threshold.level(),
            winners = outcome.included.len(),
            dropped = outcome.dropped.len(),
            "section collapsed"
        );

        dropped.extend(outcome.dropped);
        fallback_usages.extend(outcome.fallback_usages);
        pool.extend(outcome.included.into_iter().map(|mut c| {
            c.fixed = true;
            c
        }));
    }

    Ok(SectionsOutcome {
        pool,
        dropped,
        fallback_usages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptloom_core::{HeuristicCounter, OverflowPolicy, Piece, Role};

    fn annotate(pieces: &[Piece]) -> Vec<Candidate> {
        pieces
            .iter()
            .enumerate()
            .map(|(i, p)| Candidate::annotate(p, i, &HeuristicCounter))
            .collect()
    }

    fn declared(name: &str, max_cost: usize) -> BTreeMap<String, Section> {
        let mut map = BTreeMap::new();
        map.insert(name.to_string(), Section::new(name, max_cost));
        map
    }

    #[test]
    fn winners_become_fixed_atoms() {
        let pieces = vec![
            Piece::builder(Role::User, "plain").cost(5).build().unwrap(),
            Piece::builder(Role::User, "sectioned")
                .section("docs")
                .cost(8)
                .build()
                .unwrap(),
        ];
        let out =
            collapse_sections(annotate(&pieces), &declared("docs", 10), &HeuristicCounter).unwrap();
        assert_eq!(out.pool.len(), 2);
        let atom = out.pool.iter().find(|c| c.piece.content == "sectioned").unwrap();
        assert!(atom.fixed);
        assert_eq!(atom.cost, 8);
        assert!(!out.pool.iter().find(|c| c.piece.content == "plain").unwrap().fixed);
    }

    #[test]
    fn section_budget_drops_lowest_priority_first() {
        let pieces = vec![
            Piece::builder(Role::User, "keep")
                .section("docs")
                .priority(10)
                .cost(8)
                .build()
                .unwrap(),
            Piece::builder(Role::User, "lose")
                .section("docs")
                .priority(1)
                .cost(8)
                .build()
                .unwrap(),
        ];
        let out =
            collapse_sections(annotate(&pieces), &declared("docs", 10), &HeuristicCounter).unwrap();
        assert_eq!(out.pool.len(), 1);
        assert_eq!(out.pool[0].piece.content, "keep");
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].piece.content, "lose");
        assert_eq!(out.dropped[0].reason, DropReason::BelowThreshold);
    }

    #[test]
    fn zero_budget_section_drops_everything() {
        let pieces = vec![
            Piece::builder(Role::User, "a")
                .section("docs")
                .always()
                .overflow(OverflowPolicy::TruncateEnd)
                .cost(3)
                .build()
                .unwrap(),
            Piece::builder(Role::User, "b")
                .section("docs")
                .priority(1000)
                .cost(3)
                .build()
                .unwrap(),
        ];
        let out =
            collapse_sections(annotate(&pieces), &declared("docs", 0), &HeuristicCounter).unwrap();
        assert!(out.pool.is_empty());
        assert_eq!(out.dropped.len(), 2);
        // The finite level falls to the threshold, the always-keep piece
        // to the overhead floor.
        assert!(out.dropped.iter().any(|d| d.reason == DropReason::BelowThreshold));
        assert!(out.dropped.iter().any(|d| d.reason == DropReason::OverheadExceedsBudget));
    }

    #[test]
    fn undeclared_section_name_falls_through() {
        let pieces = vec![
            Piece::builder(Role::User, "stray")
                .section("nonexistent")
                .cost(5)
                .build()
                .unwrap(),
        ];
        let out =
            collapse_sections(annotate(&pieces), &declared("docs", 10), &HeuristicCounter).unwrap();
        assert_eq!(out.pool.len(), 1);
        assert!(!out.pool[0].fixed);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn section_truncation_fixes_resolved_cost() {
        let pieces = vec![
            Piece::builder(Role::User, "a".repeat(200))
                .section("docs")
                .overflow(OverflowPolicy::TruncateEnd)
                .build()
                .unwrap(),
        ];
        let out =
            collapse_sections(annotate(&pieces), &declared("docs", 12), &HeuristicCounter).unwrap();
        assert_eq!(out.pool.len(), 1);
        let atom = &out.pool[0];
        assert!(atom.fixed);
        assert!(atom.cost <= 12);
        assert!(atom.piece.content.len() < 200);
        assert_eq!(atom.original_piece().content.len(), 200);
    }

    #[test]
    fn section_fallback_usage_propagates() {
        let pieces = vec![
            Piece::builder(Role::User, "x".repeat(100))
                .section("docs")
                .fallback("短い") // 6 bytes → 2 + 4 overhead = 6
                .build()
                .unwrap(),
        ];
        let out =
            collapse_sections(annotate(&pieces), &declared("docs", 8), &HeuristicCounter).unwrap();
        assert_eq!(out.fallback_usages.len(), 1);
        assert_eq!(out.fallback_usages[0].fallback_index, 0);
        assert_eq!(out.pool[0].piece.content, "短い");
    }
}
