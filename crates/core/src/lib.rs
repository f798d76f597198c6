//! # Promptloom Core
//!
//! Domain types, validation, and error definitions for the promptloom
//! prompt renderer. This crate has **zero framework dependencies** — it
//! defines the data model that the rendering pipeline operates on.
//!
//! ## Design Philosophy
//!
//! The size oracle is defined as a trait here ([`TokenCounter`]); concrete
//! measurement strategies are pluggable. This enables:
//! - Swapping tokenizers without touching the pipeline
//! - Easy testing with deliberately skewed oracles
//! - Clean dependency graph (render and builder depend inward on core)

pub mod condition;
pub mod counter;
pub mod error;
pub mod piece;
pub mod priority;
pub mod result;
pub mod section;

// Re-export key types at crate root for ergonomics
pub use condition::Condition;
pub use counter::{CharCounter, HeuristicCounter, TokenCounter};
pub use error::{RenderError, Result, ValidationError};
pub use piece::{ContentKind, OverflowPolicy, Piece, PieceBuilder, Role};
pub use priority::Priority;
pub use result::{DropReason, DroppedPiece, FallbackUsage, RenderResult, RenderedMessage};
pub use section::Section;
