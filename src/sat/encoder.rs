//! Compilation of a neighbourhood rule over a quotient grid into CNF

use super::cardinality::Comparator;
use super::dimacs::{compile_cnf, CnfFormula};
use super::variables::TempVars;
use crate::error::Result;
use crate::grid::builder::{bound_helper, bound_population, build_grid, grid_layer};
use crate::grid::equivalence::Equivalence;
use crate::grid::node::{GridNode, PeriodicTimeAdjust, NEXT_GENERATION};
use crate::grid::template::{identity_adjust, inflate_grid_template, TagAdjust};
use crate::symbolic::{parse_lines, Clause};
use crate::symmetry::{expand_symmetry, SymmetryBasis};
use std::fmt;
use tracing::{debug, info};

/// Conway's Life, written once per neighbour count and expanded by the
/// totalistic symmetry basis.
pub const LIFE_TEMPLATE: &str = "\
# death by loneliness or crowding
~G <- ~N ~NE ~E ~SE ~S ~SW ~W
~G <- N NE E SE
# birth on 3 neighbors
G <- N NE E ~SE ~S ~SW ~W ~NW
# survival on 2 or 3 neighbors
~G <- ~O N NE ~E ~SE ~S ~SW ~W ~NW
G <- O N NE ~E ~SE ~S ~SW ~W ~NW
";

/// Parsed built-in Life template
pub fn life_template() -> Result<Vec<Clause>> {
    parse_lines(LIFE_TEMPLATE)
}

/// Owns the grid, the temporary variable counter and the symbolic clauses
/// of one problem.
pub struct GridEncoder {
    equivalence: Equivalence,
    time: PeriodicTimeAdjust,
    grid: Vec<GridNode>,
    temps: TempVars,
    clauses: Vec<Clause>,
    rule_lines: usize,
    bound_count: usize,
}

impl GridEncoder {
    /// Build the quotient grid reachable from cell (0, 0) at generation 0
    pub fn new(equivalence: Equivalence, time: PeriodicTimeAdjust) -> Self {
        let grid = build_grid(GridNode::new((0, 0, 0), equivalence, time));
        info!(
            "Grid {} {} has {} nodes",
            equivalence,
            time,
            grid.len()
        );
        Self {
            equivalence,
            time,
            grid,
            temps: TempVars::new(),
            clauses: Vec::new(),
            rule_lines: 0,
            bound_count: 0,
        }
    }

    pub fn grid(&self) -> &[GridNode] {
        &self.grid
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn equivalence(&self) -> &Equivalence {
        &self.equivalence
    }

    /// Expand `template` under `symmetry` and instantiate it at every node
    pub fn add_rule(&mut self, template: &[Clause], symmetry: SymmetryBasis, consequent: Option<&str>) -> Result<()> {
        self.add_rule_with_adjust(template, symmetry, consequent, &identity_adjust)
    }

    pub fn add_rule_with_adjust(
        &mut self,
        template: &[Clause],
        symmetry: SymmetryBasis,
        consequent: Option<&str>,
        adjust: &TagAdjust,
    ) -> Result<()> {
        let expanded = expand_symmetry(&symmetry.generators(), template)?;
        self.rule_lines += expanded.iter().filter(|c| !c.is_comment()).count();
        let consequent = consequent.or(Some(NEXT_GENERATION));
        let clauses = inflate_grid_template(&expanded, &self.grid, consequent, adjust);
        debug!("Rule added {} lines", clauses.len());
        self.clauses.extend(clauses);
        Ok(())
    }

    /// Bound the live cells of `generation`
    pub fn bound_population(&mut self, comparator: Comparator, size: i64, generation: i64) {
        let clauses = bound_population(&self.grid, comparator, size, generation, &mut self.temps);
        self.bound_count += 1;
        self.clauses.extend(clauses);
    }

    /// Bound the true instances of helper variable `name` in `generation`
    pub fn bound_helper(&mut self, comparator: Comparator, size: i64, name: &str, generation: i64) {
        let clauses = bound_helper(&self.grid, comparator, size, name, generation, &mut self.temps);
        self.bound_count += 1;
        self.clauses.extend(clauses);
    }

    /// Append hand-written clauses, for instance to fix individual cells
    pub fn add_clauses(&mut self, clauses: impl IntoIterator<Item = Clause>) {
        self.clauses.extend(clauses);
    }

    /// Number the symbolic clauses
    pub fn compile(&self) -> Result<CnfFormula> {
        compile_cnf(&self.clauses)
    }

    /// Forget clauses and temporaries; the grid is kept
    pub fn reset(&mut self) {
        self.clauses.clear();
        self.temps.clear();
        self.rule_lines = 0;
        self.bound_count = 0;
    }

    pub fn statistics(&self) -> EncodingStatistics {
        EncodingStatistics {
            equivalence: self.equivalence.to_string(),
            period: self.time.period,
            grid_nodes: self.grid.len(),
            cells_per_generation: grid_layer(&self.grid, 0).len(),
            rule_lines: self.rule_lines,
            population_bounds: self.bound_count,
            symbolic_clauses: self.clauses.iter().filter(|c| !c.is_comment()).count(),
            temporary_variables: self.temps.issued() as usize,
        }
    }
}

/// Size of an encoding before numbering
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub equivalence: String,
    pub period: i64,
    pub grid_nodes: usize,
    pub cells_per_generation: usize,
    pub rule_lines: usize,
    pub population_bounds: usize,
    pub symbolic_clauses: usize,
    pub temporary_variables: usize,
}

impl fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Encoding Statistics:")?;
        writeln!(f, "  Grid: {} period {}", self.equivalence, self.period)?;
        writeln!(f, "  Nodes: {} ({} cells per generation)", self.grid_nodes, self.cells_per_generation)?;
        writeln!(f, "  Rule lines after symmetry: {}", self.rule_lines)?;
        writeln!(f, "  Population bounds: {}", self.population_bounds)?;
        writeln!(f, "  Symbolic clauses: {}", self.symbolic_clauses)?;
        writeln!(f, "  Temporary variables: {}", self.temporary_variables)?;
        Ok(())
    }
}
