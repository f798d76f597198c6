//! Internal working record for a piece moving through the pipeline.

use promptloom_core::{Piece, TokenCounter};

/// A piece plus its annotated cost and pipeline state.
///
/// `piece` is a working copy; the caller's original is never touched.
/// When a substitution (fallback, truncation, section resolution) replaces
/// the working copy, the pre-substitution piece is kept aside so drop and
/// fallback records can point at what the caller actually submitted.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub piece: Piece,
    /// Pre-substitution copy, set on first substitution.
    pub original: Option<Box<Piece>>,
    /// Resolved cost: caller-supplied, measured, or post-substitution.
    pub cost: usize,
    /// Position in the caller's input, for stable tie-breaking.
    pub index: usize,
    /// Section-resolved atom: cost is final, never re-degraded.
    pub fixed: bool,
}

impl Candidate {
    pub(crate) fn annotate(piece: &Piece, index: usize, counter: &dyn TokenCounter) -> Self {
        let cost = piece
            .cost
            .unwrap_or_else(|| counter.count(&piece.content) + counter.overhead());
        Self {
            piece: piece.clone(),
            original: None,
            cost,
            index,
            fixed: false,
        }
    }

    /// The piece as the caller submitted it.
    pub(crate) fn original_piece(&self) -> &Piece {
        self.original.as_deref().unwrap_or(&self.piece)
    }

    /// Replace the working copy's content and cost, remembering the
    /// original. The substituted copy keeps no fallbacks: degradation is
    /// resolved exactly once.
    pub(crate) fn substitute(&mut self, content: String, cost: usize) {
        if self.original.is_none() {
            self.original = Some(Box::new(self.piece.clone()));
        }
        self.piece.content = content;
        self.piece.fallbacks.clear();
        self.piece.cost = Some(cost);
        self.cost = cost;
    }
}
