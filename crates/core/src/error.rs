//! Error types for the promptloom domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Construction and rendering each have their own error enum:
//! validation problems surface when a piece is built, never later.

use crate::piece::Piece;
use thiserror::Error;

/// Errors raised while constructing or parsing domain values.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown content kind: {0}")]
    UnknownKind(String),

    #[error("Unknown overflow policy: {0}")]
    UnknownPolicy(String),

    #[error("Tool-definition piece has no metadata payload")]
    MissingToolPayload,

    #[error("Fallback {index} duplicates the primary content")]
    RedundantFallback { index: usize },

    #[error("Tool-definition piece with empty content needs an explicit cost")]
    UnmeasurableCost,
}

/// Errors raised during a render call.
///
/// A render either completes with a full [`RenderResult`](crate::RenderResult)
/// or fails with one of these — no partial result is ever returned.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A piece with `OverflowPolicy::Fail` and non-empty content could not
    /// fit in any form: primary and every fallback exceeded the remaining
    /// budget. Carries the offending piece and the budget left at the point
    /// of failure so the caller can diagnose and switch to a truncating
    /// policy or retry with a larger budget.
    #[error(
        "Piece at sequence {} cannot fit: {remaining} budget units remained \
         and no variant was small enough",
        .piece.sequence
    )]
    Oversized { piece: Box<Piece>, remaining: usize },
}

/// Result type alias using our render error.
pub type Result<T> = std::result::Result<T, RenderError>;
