//! Final result assembly: messages, tool payloads, cache breakpoint.

use crate::candidate::Candidate;
use promptloom_core::{
    ContentKind, DroppedPiece, FallbackUsage, Piece, RenderResult, RenderedMessage,
};

/// Build the output aggregate from resolved candidates.
///
/// `included` arrives in resolution (sequence) order. Reservations stay in
/// `included` and `total_cost` but produce no message. The cache breakpoint
/// is the index of the last message whose piece was marked cacheable.
pub(crate) fn assemble(
    budget: usize,
    threshold: i64,
    included: Vec<Candidate>,
    dropped: Vec<DroppedPiece>,
    condition_excluded: Vec<Piece>,
    fallback_usages: Vec<FallbackUsage>,
) -> RenderResult {
    let mut messages = Vec::new();
    let mut tools = Vec::new();
    let mut total_cost = 0usize;
    let mut cache_breakpoint = None;
    let mut included_pieces = Vec::with_capacity(included.len());

    for cand in included {
        total_cost += cand.cost;

        let mut piece = cand.piece;
        piece.cost = Some(cand.cost);

        if piece.kind == ContentKind::ToolDefinition {
            if let Some(payload) = &piece.metadata {
                tools.push(payload.clone());
            }
        }

        if !piece.content.is_empty() {
            if piece.cacheable {
                cache_breakpoint = Some(messages.len());
            }
            messages.push(RenderedMessage {
                role: piece.role,
                content: piece.content.clone(),
            });
        }

        included_pieces.push(piece);
    }

    RenderResult {
        messages,
        tools,
        total_cost,
        budget,
        threshold,
        included: included_pieces,
        dropped,
        condition_excluded,
        fallback_usages,
        cache_breakpoint,
    }
}
