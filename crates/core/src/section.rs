//! Section — a named sub-budget.

use serde::{Deserialize, Serialize};

/// A sub-budget cap that pieces can opt into by name.
///
/// Pieces carrying a declared section name are rendered independently
/// against `max_cost` before the main pass; pieces referencing an
/// undeclared name compete in the main pool as if unsectioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub max_cost: usize,
}

impl Section {
    pub fn new(name: impl Into<String>, max_cost: usize) -> Self {
        Self {
            name: name.into(),
            max_cost,
        }
    }
}
