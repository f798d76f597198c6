//! # Promptloom Builder
//!
//! The accumulation front door: collect pieces, hand out sequence numbers,
//! declare sections, and render.
//!
//! Sequence numbers are assigned in increments of 10, leaving gaps so
//! callers can interleave explicitly-sequenced pieces between
//! builder-added ones without renumbering.

use promptloom_core::{
    Piece, PieceBuilder, Priority, RenderError, RenderResult, Role, Section, TokenCounter,
    ValidationError,
};
use promptloom_render::PromptRenderer;
use std::collections::BTreeMap;

/// Step between auto-assigned sequence numbers.
const SEQUENCE_STEP: i64 = 10;

/// Accumulates pieces and sections for rendering.
///
/// Reusable: `render` snapshots the accumulated state without consuming
/// the builder, so the same builder can render against several budgets or
/// oracles.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    pieces: Vec<Piece>,
    sections: BTreeMap<String, Section>,
    next_sequence: i64,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a named sub-budget. Re-declaring a name replaces it.
    pub fn section(&mut self, name: impl Into<String>, max_cost: usize) -> &mut Self {
        let section = Section::new(name, max_cost);
        self.sections.insert(section.name.clone(), section);
        self
    }

    /// Append a pre-built piece, keeping its explicit sequence. The
    /// auto-sequence counter advances past it so later builder-added
    /// pieces land after.
    pub fn push(&mut self, piece: Piece) -> &mut Self {
        self.next_sequence = self.next_sequence.max(piece.sequence.saturating_add(SEQUENCE_STEP));
        self.pieces.push(piece);
        self
    }

    /// Validate and append a piece under construction. A piece built
    /// without an explicit sequence receives the next free number.
    pub fn add(&mut self, builder: PieceBuilder) -> Result<&mut Self, ValidationError> {
        let piece = builder.sequence_default(self.next_sequence).build()?;
        Ok(self.push(piece))
    }

    /// Append a system piece at the given priority.
    pub fn system(&mut self, content: impl Into<String>, priority: impl Into<Priority>) -> &mut Self {
        self.text_piece(Role::System, content, priority)
    }

    /// Append a user piece at the given priority.
    pub fn user(&mut self, content: impl Into<String>, priority: impl Into<Priority>) -> &mut Self {
        self.text_piece(Role::User, content, priority)
    }

    /// Append an assistant piece at the given priority.
    pub fn assistant(
        &mut self,
        content: impl Into<String>,
        priority: impl Into<Priority>,
    ) -> &mut Self {
        self.text_piece(Role::Assistant, content, priority)
    }

    fn text_piece(
        &mut self,
        role: Role,
        content: impl Into<String>,
        priority: impl Into<Priority>,
    ) -> &mut Self {
        let mut piece = Piece::text(role, content);
        piece.priority = priority.into();
        piece.sequence = self.next_sequence;
        self.push(piece)
    }

    /// The accumulated pieces, in insertion order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Render the accumulated pieces against a budget.
    pub fn render(
        &self,
        budget: usize,
        counter: &dyn TokenCounter,
    ) -> Result<RenderResult, RenderError> {
        PromptRenderer::new(budget)
            .with_sections(self.sections.values().cloned())
            .render(&self.pieces, counter)
    }
}
