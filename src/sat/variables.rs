//! Variable management for CNF encoding

use crate::symbolic::Literal;
use std::collections::{BTreeMap, BTreeSet};

/// Issues fresh temporary variable names (`{x001}`, `{x002}`, ...).
///
/// One counter belongs to one compilation; two encoders never share it.
#[derive(Debug, Default)]
pub struct TempVars {
    issued: u32,
}

impl TempVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused temporary literal
    pub fn next_var(&mut self) -> Literal {
        self.issued += 1;
        Literal::new(format!("{{x{:03x}}}", self.issued))
    }

    /// Number of temporaries handed out so far
    pub fn issued(&self) -> u32 {
        self.issued
    }

    /// Clear the counter (useful for testing)
    pub fn clear(&mut self) {
        self.issued = 0;
    }
}

/// Bidirectional map between boolean variable names and 1-based CNF indices
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    index_of: BTreeMap<String, i32>,
    name_of: BTreeMap<i32, String>,
}

impl SymbolTable {
    /// Number names in sorted order, starting from 1
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        let mut table = Self::default();
        for (i, name) in sorted.into_iter().enumerate() {
            table.insert(name, i as i32 + 1);
        }
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, index: i32) {
        let name = name.into();
        self.name_of.insert(index, name.clone());
        self.index_of.insert(name, index);
    }

    pub fn index(&self, name: &str) -> Option<i32> {
        self.index_of.get(name).copied()
    }

    pub fn name(&self, index: i32) -> Option<&str> {
        self.name_of.get(&index).map(String::as_str)
    }

    /// Signed index of a boolean literal
    pub fn encode(&self, literal: &Literal) -> Option<i32> {
        self.index(literal.name())
            .map(|ix| if literal.polarity() { ix } else { -ix })
    }

    pub fn len(&self) -> usize {
        self.index_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_of.is_empty()
    }

    /// Names with their indices, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.index_of.iter().map(|(name, ix)| (name.as_str(), *ix))
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        let mut stats = VariableStatistics {
            total_variables: self.len(),
            ..Default::default()
        };

        for name in self.index_of.keys() {
            if name.starts_with("{x") {
                stats.temporary_variables += 1;
            } else if name.contains('$') {
                stats.helper_variables += 1;
            } else if name.contains('#') {
                stats.bit_variables += 1;
            } else if name.starts_with("c_") {
                stats.cell_variables += 1;
            }
        }
        stats
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone, Default)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub cell_variables: usize,
    pub helper_variables: usize,
    pub bit_variables: usize,
    pub temporary_variables: usize,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Cell variables: {}", self.cell_variables)?;
        writeln!(f, "  Helper variables: {}", self.helper_variables)?;
        writeln!(f, "  Tag bit variables: {}", self.bit_variables)?;
        writeln!(f, "  Temporary variables: {}", self.temporary_variables)?;
        Ok(())
    }
}
