//! # Promptloom Render
//!
//! The rendering pipeline: fits a set of prioritized pieces into a fixed
//! budget, dropping or degrading the lowest-value pieces first.
//!
//! Pipeline stages, in order:
//!
//! 1. **Condition filter** — remove pieces whose predicate is false this render
//! 2. **Cost annotation** — measure pieces lacking a precomputed cost
//! 3. **Section sub-render** — resolve named sub-budgets independently
//! 4. **Threshold search** — binary search for the lowest surviving priority
//! 5. **Fit resolution** — sequence-ordered greedy pass with fallbacks and
//!    truncation, tracking the exact remaining budget
//! 6. **Assembly** — message list, tool payloads, cache breakpoint
//!
//! # Determinism
//!
//! Rendering is deterministic: identical immutable inputs and a
//! deterministic size oracle always produce an identical result. No random
//! or time-dependent logic is used, and no state survives a render call.

mod assemble;
mod candidate;
mod renderer;
mod resolver;
mod sections;
mod threshold;
mod truncate;

pub use renderer::PromptRenderer;
pub use truncate::TRUNCATION_SEPARATOR;
