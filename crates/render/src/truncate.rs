//! Budget-correct content shrinking.
//!
//! Converts an available cost budget into a byte estimate with the
//! conventional 4-bytes-per-unit ratio, cuts at char boundaries, then
//! re-measures with the real oracle and shrinks proportionally until the
//! measured cost fits. The ratio is a starting guess, not an assumption:
//! the correction loop converges for any deterministic oracle (one unit
//! per byte, non-uniform per-character cost, ...).

use promptloom_core::{OverflowPolicy, TokenCounter};
use tracing::trace;

/// Marker joining the kept prefix and suffix of middle-truncated content.
pub const TRUNCATION_SEPARATOR: &str = " [...] ";

/// Initial guess: bytes of content per cost unit.
const BYTES_PER_UNIT: usize = 4;

/// Shrink `content` until its measured cost is at most `available`.
///
/// Returns the shrunken content and its measured cost (without overhead).
/// The result never splits a multi-byte character. An empty result is
/// possible when `available` is tiny; callers decide whether an empty
/// remnant is worth including.
pub(crate) fn shrink_to_fit(
    content: &str,
    available: usize,
    policy: OverflowPolicy,
    counter: &dyn TokenCounter,
) -> (String, usize) {
    let mut estimate = available
        .saturating_mul(BYTES_PER_UNIT)
        .min(content.len());

    loop {
        let candidate = match policy {
            OverflowPolicy::TruncateEnd => truncate_end(content, estimate),
            OverflowPolicy::TruncateMiddle => truncate_middle(content, estimate),
            // The resolver only routes truncating policies here.
            OverflowPolicy::Fail => String::new(),
        };
        let measured = counter.count(&candidate);
        if measured <= available || candidate.is_empty() {
            return (candidate, measured);
        }

        // The heuristic overestimated how many bytes fit one unit: scale
        // the estimate by the achieved/target ratio, clamped to strictly
        // decrease so the loop terminates.
        let scaled = estimate.saturating_mul(available) / measured;
        let next = scaled.min(estimate - 1);
        trace!(estimate, measured, available, next, "truncation estimate corrected");
        estimate = next;
    }
}

/// Keep a prefix of at most `max_bytes`, cut at a char boundary.
fn truncate_end(content: &str, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content.to_string();
    }
    content[..floor_char_boundary(content, max_bytes)].to_string()
}

/// Keep a prefix and a suffix joined by [`TRUNCATION_SEPARATOR`], the
/// usable bytes split as evenly as possible. Content already within
/// `max_bytes` is returned unchanged; a budget too small to carry the
/// separator degrades to a plain prefix.
fn truncate_middle(content: &str, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content.to_string();
    }
    let usable = max_bytes.saturating_sub(TRUNCATION_SEPARATOR.len());
    if usable == 0 {
        return truncate_end(content, max_bytes);
    }

    let head_len = usable.div_ceil(2);
    let tail_len = usable / 2;
    let head_end = floor_char_boundary(content, head_len);
    let tail_start = ceil_char_boundary(content, content.len() - tail_len);

    format!(
        "{}{}{}",
        &content[..head_end],
        TRUNCATION_SEPARATOR,
        &content[tail_start..]
    )
}

/// Largest index ≤ `target` that lies on a char boundary.
fn floor_char_boundary(s: &str, target: usize) -> usize {
    if target >= s.len() {
        return s.len();
    }
    let mut i = target;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest index ≥ `target` that lies on a char boundary.
fn ceil_char_boundary(s: &str, target: usize) -> usize {
    if target >= s.len() {
        return s.len();
    }
    let mut i = target;
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
