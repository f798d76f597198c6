//! Render output aggregate and its accounting records.

use crate::piece::{Piece, Role};
use serde::{Deserialize, Serialize};

/// One role+content pair in the final output sequence. The only
/// wire-relevant contract of the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
}

/// Why a piece was dropped instead of included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Priority below the converged threshold.
    BelowThreshold,
    /// Survived the threshold but the greedy pass ran out of budget.
    BudgetExhausted,
    /// A reservation (empty content) that did not fit; never fatal.
    EmptyReservation,
    /// A truncating piece whose fixed overhead alone exceeded what was left.
    OverheadExceedsBudget,
}

/// A dropped piece together with the reason.
#[derive(Debug, Clone)]
pub struct DroppedPiece {
    /// The caller's original piece, unmodified.
    pub piece: Piece,
    pub reason: DropReason,
}

/// Record of a fallback substitution during fit resolution.
#[derive(Debug, Clone)]
pub struct FallbackUsage {
    /// The original piece, before substitution.
    pub piece: Piece,
    /// Index into the original piece's fallback list.
    pub fallback_index: usize,
}

/// Everything a render call produces.
///
/// Every input piece lands in exactly one of `included`, `dropped`, or
/// `condition_excluded`. Included pieces are resolved copies: fallback or
/// truncation substitutions are applied and `cost` is the final measured
/// cost. The caller's pieces are never mutated.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Output messages, sequence-ordered, reservations excluded.
    pub messages: Vec<RenderedMessage>,

    /// Opaque payloads of included tool-definition pieces, in sequence order.
    pub tools: Vec<serde_json::Value>,

    /// Sum of included piece costs. Always ≤ `budget`.
    pub total_cost: usize,

    /// The budget this render was resolved against.
    pub budget: usize,

    /// The converged minimum finite priority level: the lowest level whose
    /// optimistic cost fit the budget, one above the highest level present
    /// when nothing finite fit, or 0 when no finite levels existed.
    pub threshold: i64,

    /// Resolved copies of surviving pieces, sequence-ordered.
    pub included: Vec<Piece>,

    /// Pieces excluded by threshold or budget, with reasons.
    pub dropped: Vec<DroppedPiece>,

    /// Pieces whose condition evaluated false this render.
    pub condition_excluded: Vec<Piece>,

    /// Which pieces resolved to which fallback.
    pub fallback_usages: Vec<FallbackUsage>,

    /// Index into `messages` of the last message from a cacheable piece.
    pub cache_breakpoint: Option<usize>,
}

impl RenderResult {
    /// Budget utilization as a fraction in `[0, 1]`.
    pub fn utilization(&self) -> f64 {
        if self.budget == 0 {
            return 0.0;
        }
        self.total_cost as f64 / self.budget as f64
    }
}
