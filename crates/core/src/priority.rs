//! Priority domain: finite levels plus an always-keep sentinel.
//!
//! Modeled as a tagged variant rather than a special integer constant so
//! that `Always` cannot collide with, or overflow against, any finite level.

use serde::{Deserialize, Serialize};

/// Relative importance of a piece under budget pressure. Higher survives.
///
/// The derived ordering places `Always` above every `Finite` value:
///
/// ```
/// use promptloom_core::Priority;
/// assert!(Priority::Always > Priority::Finite(i64::MAX));
/// assert!(Priority::Finite(10) > Priority::Finite(9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// An ordinary priority level, subject to threshold exclusion.
    Finite(i64),
    /// Kept at any threshold. Still subject to the exact fit pass.
    Always,
}

impl Priority {
    /// The finite level, if this priority is finite.
    pub fn finite(self) -> Option<i64> {
        match self {
            Self::Finite(level) => Some(level),
            Self::Always => None,
        }
    }

    /// Whether this priority clears the given threshold level.
    /// `Always` clears every threshold.
    pub fn clears(self, threshold: i64) -> bool {
        match self {
            Self::Finite(level) => level >= threshold,
            Self::Always => true,
        }
    }
}

impl From<i64> for Priority {
    fn from(level: i64) -> Self {
        Self::Finite(level)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Finite(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_outranks_every_finite_level() {
        assert!(Priority::Always > Priority::Finite(i64::MAX));
        assert!(Priority::Always > Priority::Finite(0));
        assert!(Priority::Always > Priority::Finite(i64::MIN));
    }

    #[test]
    fn finite_levels_order_numerically() {
        assert!(Priority::Finite(100) > Priority::Finite(99));
        assert!(Priority::Finite(-1) < Priority::Finite(0));
    }

    #[test]
    fn always_clears_any_threshold() {
        assert!(Priority::Always.clears(i64::MAX));
    }

    #[test]
    fn finite_clears_at_or_above_level() {
        assert!(Priority::Finite(10).clears(10));
        assert!(Priority::Finite(10).clears(9));
        assert!(!Priority::Finite(10).clears(11));
    }

    #[test]
    fn from_integer() {
        assert_eq!(Priority::from(42), Priority::Finite(42));
    }
}
