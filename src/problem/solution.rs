//! Decoded solutions of grid problems

use crate::grid::values::{get_value_grid, ValueGrid};
use crate::sat::dimacs::Value;
use crate::utils::display::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One satisfying assignment, decoded into named values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Position among the solutions of one run, from 1
    pub index: usize,
    /// User variables and temporaries with their values, sorted by name
    pub values: Vec<(String, Value)>,
    /// Cell values `c_<i>_<j>_<t>` by generation
    pub grid: ValueGrid,
    #[serde(skip)]
    pub solve_time: Duration,
    pub metadata: SolutionMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Grid equivalence the problem was built on
    pub equivalence: String,
    /// Live cells in each generation
    pub living_cells: Vec<usize>,
    pub variable_count: usize,
    pub clause_count: usize,
}

impl Solution {
    pub fn new(
        index: usize,
        values: Vec<(String, Value)>,
        equivalence: String,
        variable_count: usize,
        clause_count: usize,
        solve_time: Duration,
    ) -> Self {
        let grid = get_value_grid("c", &values);
        let living_cells = (0..grid.generations).map(|t| grid.living_count(t)).collect();
        Self {
            index,
            values,
            grid,
            solve_time,
            metadata: SolutionMetadata {
                equivalence,
                living_cells,
                variable_count,
                clause_count,
            },
        }
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.values
            .binary_search_by(|(key, _)| key.as_str().cmp(name))
            .ok()
            .map(|ix| self.values[ix].1)
    }

    pub fn living_count(&self, generation: usize) -> usize {
        self.metadata.living_cells.get(generation).copied().unwrap_or(0)
    }

    pub fn render(&self, format: OutputFormat) -> String {
        format.render(&self.values)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Header line and the rendered values
    pub fn format(&self, format: OutputFormat) -> String {
        let counts: Vec<String> = self.metadata.living_cells.iter().map(usize::to_string).collect();
        format!(
            "Solution {} on {} (live cells per generation: {}), found in {:.3}s\n{}",
            self.index,
            self.metadata.equivalence,
            counts.join(", "),
            self.solve_time.as_secs_f64(),
            self.render(format)
        )
    }
}
