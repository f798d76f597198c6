//! Inclusion conditions — zero-argument predicates evaluated per render.

use std::fmt;
use std::sync::Arc;

/// A dynamic inclusion predicate attached to a piece.
///
/// Evaluated once per render call, at render time: a condition that reads
/// external mutable state reflects that state at the moment of the call.
/// State should be passed in explicitly (e.g. via a captured `Arc`), never
/// through globals.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> bool + Send + Sync>);

impl Condition {
    /// Wrap a predicate closure.
    pub fn new(predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Evaluate the predicate.
    pub fn evaluate(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(<fn>)")
    }
}
