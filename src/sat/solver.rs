//! SAT solver backends: in-process CaDiCaL and external solver processes

use super::dimacs::{parse_assignment, CnfFormula, CnfLine, VARIABLE_COMMENT};
use super::variables::SymbolTable;
use crate::error::{CompileError, Result};
use cadical::Solver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of SAT solving
#[derive(Debug, Clone)]
pub struct SolverSolution {
    /// Signed literal for every assigned variable, ordered by variable
    pub assignment: Vec<i32>,
    pub solve_time: Duration,
}

impl SolverSolution {
    pub fn value(&self, var: i32) -> Option<bool> {
        self.assignment
            .iter()
            .find(|ix| ix.abs() == var)
            .map(|&ix| ix > 0)
    }

    pub fn to_map(&self) -> HashMap<i32, bool> {
        self.assignment.iter().map(|&ix| (ix.abs(), ix > 0)).collect()
    }

    /// Clause that every other solution satisfies
    pub fn blocking_clause(&self) -> Vec<i32> {
        self.assignment.iter().map(|&ix| -ix).collect()
    }
}

impl std::fmt::Display for SolverSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solution:")?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Variables assigned: {}", self.assignment.len())?;

        write!(f, "  Sample assignments: ")?;
        for (i, ix) in self.assignment.iter().take(10).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", ix.abs(), if *ix > 0 { "T" } else { "F" })?;
        }
        if self.assignment.len() > 10 {
            write!(f, ", ...")?;
        }
        writeln!(f)?;
        Ok(())
    }
}

/// A solver accepting numbered clauses
pub trait SatSolver {
    /// Add a single clause; the empty clause makes the problem unsatisfiable
    fn add_clause(&mut self, clause: &[i32]) -> Result<()>;

    /// Solve the SAT problem and return the first solution
    fn solve(&mut self) -> Result<Option<SolverSolution>>;

    fn variable_count(&self) -> usize;

    fn clause_count(&self) -> usize;

    /// Add every clause of a formula
    fn add_formula(&mut self, formula: &CnfFormula) -> Result<()> {
        for clause in formula.clauses() {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Solve repeatedly, blocking each solution found, up to a limit
    fn solve_multiple(&mut self, max_solutions: usize) -> Result<Vec<SolverSolution>> {
        let mut solutions = Vec::new();
        for _ in 0..max_solutions {
            let Some(solution) = self.solve()? else {
                break;
            };
            self.add_clause(&solution.blocking_clause())?;
            solutions.push(solution);
        }
        Ok(solutions)
    }
}

fn highest_variable(clause: &[i32]) -> usize {
    clause.iter().map(|ix| ix.unsigned_abs() as usize).max().unwrap_or(0)
}

/// SAT solver wrapper for CaDiCaL
pub struct CadicalSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    has_empty_clause: bool,
}

impl CadicalSolver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            has_empty_clause: false,
        }
    }

    /// Reset the solver (clear all clauses)
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn extract_assignment(&self) -> Vec<i32> {
        (1..=self.variable_count as i32)
            .filter_map(|var| self.solver.value(var).map(|value| if value { var } else { -var }))
            .collect()
    }
}

impl Default for CadicalSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver for CadicalSolver {
    fn add_clause(&mut self, clause: &[i32]) -> Result<()> {
        if clause.is_empty() {
            self.has_empty_clause = true;
        } else {
            self.variable_count = self.variable_count.max(highest_variable(clause));
            self.solver.add_clause(clause.iter().copied());
        }
        self.clause_count += 1;
        Ok(())
    }

    fn solve(&mut self) -> Result<Option<SolverSolution>> {
        if self.has_empty_clause {
            return Ok(None);
        }

        let start_time = Instant::now();
        let result = self.solver.solve();
        let solve_time = start_time.elapsed();
        debug!("CaDiCaL finished in {:.3}s: {:?}", solve_time.as_secs_f64(), result);

        match result {
            Some(true) => Ok(Some(SolverSolution {
                assignment: self.extract_assignment(),
                solve_time,
            })),
            Some(false) => Ok(None),
            None => Err(CompileError::Solver("CaDiCaL returned no result".to_string())),
        }
    }

    fn variable_count(&self) -> usize {
        self.variable_count
    }

    fn clause_count(&self) -> usize {
        self.clause_count
    }
}

/// External solver programs and whether they accept `--seed=N`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverCommand {
    Cadical,
    Kissat,
    Lingeling,
}

impl SolverCommand {
    pub fn program(&self) -> &'static str {
        match self {
            SolverCommand::Cadical => "cadical",
            SolverCommand::Kissat => "kissat",
            SolverCommand::Lingeling => "lingeling",
        }
    }

    pub fn supports_seed(&self) -> bool {
        !matches!(self, SolverCommand::Kissat)
    }

    /// Arguments for solving `input`
    pub fn arguments(&self, input: &Path, seed: Option<u64>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(seed) = seed.filter(|_| self.supports_seed()) {
            args.push(format!("--seed={}", seed));
        }
        args.push(input.display().to_string());
        args
    }
}

/// Runs a solver program on a DIMACS file and reads its `v` lines.
pub struct ExternalSolver {
    command: SolverCommand,
    seed: Option<u64>,
    timeout: Option<Duration>,
    input_file: PathBuf,
    solution_file: PathBuf,
    symbols: SymbolTable,
    lines: Vec<CnfLine>,
    clause_count: usize,
    variable_count: usize,
}

impl ExternalSolver {
    pub fn new(command: SolverCommand, input_file: impl Into<PathBuf>, solution_file: impl Into<PathBuf>) -> Self {
        Self {
            command,
            seed: None,
            timeout: None,
            input_file: input_file.into(),
            solution_file: solution_file.into(),
            symbols: SymbolTable::default(),
            lines: Vec::new(),
            clause_count: 0,
            variable_count: 0,
        }
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn command(&self) -> SolverCommand {
        self.command
    }

    fn write_input(&self) -> Result<()> {
        let mut out = BufWriter::new(File::create(&self.input_file)?);
        writeln!(out, "p cnf {} {}", self.variable_count, self.clause_count)?;
        for (name, ix) in self.symbols.iter() {
            writeln!(out, "{}{}: {}", VARIABLE_COMMENT, name, ix)?;
        }
        for line in &self.lines {
            match line {
                CnfLine::Comment(text) => writeln!(out, "c {}", text)?,
                CnfLine::Clause(clause) => {
                    for ix in clause {
                        write!(out, "{} ", ix)?;
                    }
                    writeln!(out, "0")?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Solve an existing DIMACS file, copying solver output to `solution`.
    ///
    /// Returns `None` when the solver reports unsatisfiability.
    pub fn run_file(&self, input: &Path, solution: &Path) -> Result<Option<Vec<i32>>> {
        let args = self.command.arguments(input, self.seed);
        info!("Running {} {}", self.command.program(), args.join(" "));
        info!("Writing output to {}", solution.display());

        let output = File::create(solution)?;
        let mut child = Command::new(self.command.program())
            .args(&args)
            .stdout(Stdio::from(output))
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CompileError::Solver(format!("Cannot start {}: {}", self.command.program(), e)))?;

        let start_time = Instant::now();
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if let Some(timeout) = self.timeout {
                if start_time.elapsed() >= timeout {
                    warn!("{} exceeded {}s, killing it", self.command.program(), timeout.as_secs());
                    child.kill()?;
                    child.wait()?;
                    return Err(CompileError::Timeout(timeout.as_secs()));
                }
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        let text = fs::read_to_string(solution)?;
        if text.lines().any(|line| line.trim() == "s UNSATISFIABLE") {
            return Ok(None);
        }
        if !text.lines().any(|line| line.trim() == "s SATISFIABLE") {
            return Err(CompileError::Solver(format!(
                "{} gave no answer, see {}",
                self.command.program(),
                solution.display()
            )));
        }
        Ok(Some(parse_assignment(BufReader::new(File::open(solution)?))?))
    }
}

impl SatSolver for ExternalSolver {
    fn add_clause(&mut self, clause: &[i32]) -> Result<()> {
        self.variable_count = self.variable_count.max(highest_variable(clause));
        self.lines.push(CnfLine::Clause(clause.to_vec()));
        self.clause_count += 1;
        Ok(())
    }

    fn add_formula(&mut self, formula: &CnfFormula) -> Result<()> {
        self.variable_count = self.variable_count.max(formula.variable_count());
        for (name, ix) in formula.symbols.iter() {
            self.symbols.insert(name, ix);
        }
        for line in &formula.lines {
            match line {
                CnfLine::Comment(text) => self.lines.push(CnfLine::Comment(text.clone())),
                CnfLine::Clause(clause) => self.add_clause(clause)?,
            }
        }
        Ok(())
    }

    fn solve(&mut self) -> Result<Option<SolverSolution>> {
        self.write_input()?;
        let start_time = Instant::now();
        let assignment = self.run_file(&self.input_file, &self.solution_file)?;
        Ok(assignment.map(|assignment| SolverSolution {
            assignment,
            solve_time: start_time.elapsed(),
        }))
    }

    fn variable_count(&self) -> usize {
        self.variable_count
    }

    fn clause_count(&self) -> usize {
        self.clause_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = CadicalSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = CadicalSolver::new();
        // x1 or x2, not x1 or x2
        solver.add_clause(&[1, 2]).unwrap();
        solver.add_clause(&[-1, 2]).unwrap();

        let solution = solver.solve().unwrap().unwrap();
        assert_eq!(solution.value(2), Some(true));
        assert_eq!(solution.to_map().len(), 2);
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = CadicalSolver::new();
        solver.add_clause(&[1]).unwrap();
        solver.add_clause(&[-1]).unwrap();
        assert!(solver.solve().unwrap().is_none());
    }

    #[test]
    fn test_empty_clause_is_unsatisfiable() {
        let mut solver = CadicalSolver::new();
        solver.add_clause(&[1, 2]).unwrap();
        solver.add_clause(&[]).unwrap();
        assert!(solver.solve().unwrap().is_none());
        assert_eq!(solver.clause_count(), 2);
    }

    #[test]
    fn test_multiple_solutions() {
        let mut solver = CadicalSolver::new();
        solver.add_clause(&[1, 2]).unwrap();

        // exactly three assignments satisfy x1 or x2
        let solutions = solver.solve_multiple(10).unwrap();
        assert_eq!(solutions.len(), 3);
        for solution in &solutions {
            assert!(solution.value(1) == Some(true) || solution.value(2) == Some(true));
        }
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = CadicalSolver::new();
        solver.add_clause(&[1, -5, 3]).unwrap();
        assert_eq!(solver.variable_count(), 5);
        solver.add_clause(&[2, -7]).unwrap();
        assert_eq!(solver.variable_count(), 7);
    }

    #[test]
    fn test_command_arguments() {
        let input = Path::new("problem.dim");
        assert_eq!(
            SolverCommand::Cadical.arguments(input, Some(7)),
            vec!["--seed=7", "problem.dim"]
        );
        // kissat ignores the seed
        assert_eq!(SolverCommand::Kissat.arguments(input, Some(7)), vec!["problem.dim"]);
        assert_eq!(SolverCommand::Lingeling.arguments(input, None), vec!["problem.dim"]);
    }

    #[test]
    fn test_external_writes_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("p.dim");
        let mut solver = ExternalSolver::new(SolverCommand::Kissat, &input, dir.path().join("p.out"));
        solver.add_clause(&[1, -3]).unwrap();
        solver.add_clause(&[2]).unwrap();
        solver.write_input().unwrap();
        assert_eq!(fs::read_to_string(&input).unwrap(), "p cnf 3 2\n1 -3 0\n2 0\n");
    }

    #[test]
    fn test_missing_program_is_solver_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("p.dim");
        fs::write(&input, "p cnf 1 1\n1 0\n").unwrap();
        let mut solver = ExternalSolver::new(SolverCommand::Lingeling, &input, dir.path().join("p.out"));
        solver.set_timeout(Duration::from_secs(5));
        // succeeds only where lingeling is installed
        match solver.run_file(&input, &dir.path().join("p.out")) {
            Ok(Some(assignment)) => assert_eq!(assignment, vec![1]),
            Ok(None) => panic!("trivial formula reported unsatisfiable"),
            Err(e) => assert!(matches!(e, CompileError::Solver(_))),
        }
    }
}
