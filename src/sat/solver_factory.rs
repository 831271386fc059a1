//! Factory for creating SAT solver instances based on configuration

use super::dimacs::CnfFormula;
use super::solver::{CadicalSolver, ExternalSolver, SatSolver, SolverSolution};
use crate::config::{SolverBackend, SolverConfig};
use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Unified SAT solver interface that can use different backends
pub enum UnifiedSatSolver {
    Cadical(CadicalSolver),
    External(ExternalSolver),
}

impl UnifiedSatSolver {
    /// Create a solver for `config`; external solvers exchange files named
    /// after `file_root` (`.dim` input, `.out` solver output).
    pub fn new(config: &SolverConfig, file_root: &Path) -> Self {
        match config.backend {
            SolverBackend::Cadical => UnifiedSatSolver::Cadical(CadicalSolver::new()),
            SolverBackend::External => {
                let mut solver = ExternalSolver::new(
                    config.command,
                    file_root.with_extension("dim"),
                    file_root.with_extension("out"),
                );
                solver.set_seed(config.seed);
                if config.timeout_seconds > 0 {
                    solver.set_timeout(Duration::from_secs(config.timeout_seconds));
                }
                UnifiedSatSolver::External(solver)
            }
        }
    }

    fn inner(&mut self) -> &mut dyn SatSolver {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver,
            UnifiedSatSolver::External(solver) => solver,
        }
    }

    /// Add a single clause to the solver
    pub fn add_clause(&mut self, clause: &[i32]) -> Result<()> {
        self.inner().add_clause(clause)
    }

    pub fn add_formula(&mut self, formula: &CnfFormula) -> Result<()> {
        self.inner().add_formula(formula)
    }

    /// Solve the SAT problem and return the first solution
    pub fn solve(&mut self) -> Result<Option<SolverSolution>> {
        self.inner().solve()
    }

    /// Solve and find multiple solutions up to a limit
    pub fn solve_multiple(&mut self, max_solutions: usize) -> Result<Vec<SolverSolution>> {
        self.inner().solve_multiple(max_solutions)
    }

    pub fn variable_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.variable_count(),
            UnifiedSatSolver::External(solver) => solver.variable_count(),
        }
    }

    pub fn clause_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.clause_count(),
            UnifiedSatSolver::External(solver) => solver.clause_count(),
        }
    }

    /// Get the backend type being used
    pub fn backend(&self) -> SolverBackend {
        match self {
            UnifiedSatSolver::Cadical(_) => SolverBackend::Cadical,
            UnifiedSatSolver::External(_) => SolverBackend::External,
        }
    }
}

impl Default for UnifiedSatSolver {
    fn default() -> Self {
        UnifiedSatSolver::Cadical(CadicalSolver::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::dimacs::compile_cnf;
    use crate::sat::solver::SolverCommand;
    use crate::symbolic::parse_lines;

    fn config(backend: SolverBackend) -> SolverConfig {
        SolverConfig {
            backend,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_cadical_solver_creation() {
        let solver = UnifiedSatSolver::new(&config(SolverBackend::Cadical), Path::new("unused"));
        assert_eq!(solver.backend(), SolverBackend::Cadical);
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn test_external_solver_creation() {
        let mut settings = config(SolverBackend::External);
        settings.command = SolverCommand::Kissat;
        let solver = UnifiedSatSolver::new(&settings, Path::new("out/problem"));
        assert_eq!(solver.backend(), SolverBackend::External);
        match solver {
            UnifiedSatSolver::External(external) => assert_eq!(external.command(), SolverCommand::Kissat),
            UnifiedSatSolver::Cadical(_) => panic!("wrong backend"),
        }
    }

    #[test]
    fn test_simple_satisfiable_cadical() {
        let mut solver = UnifiedSatSolver::default();
        solver.add_clause(&[1]).unwrap();

        let solution = solver.solve().unwrap().unwrap();
        assert_eq!(solution.value(1), Some(true));
    }

    #[test]
    fn test_unsatisfiable_cadical() {
        let mut solver = UnifiedSatSolver::default();
        solver.add_clause(&[1]).unwrap();
        solver.add_clause(&[-1]).unwrap();
        assert!(solver.solve().unwrap().is_none());
    }

    #[test]
    fn test_formula_solutions() {
        let formula = compile_cnf(&parse_lines("a b\n~a ~b").unwrap()).unwrap();
        let mut solver = UnifiedSatSolver::default();
        solver.add_formula(&formula).unwrap();
        assert_eq!(solver.clause_count(), 2);

        // exactly one of a, b
        let solutions = solver.solve_multiple(5).unwrap();
        assert_eq!(solutions.len(), 2);
    }
}
