//! Settings-driven grid searches: compile, write files, solve, decode

use super::{AssignmentValidator, Solution};
use crate::config::{Settings, SolverBackend};
use crate::sat::dimacs::{decode_assignment, format_solver_output, CnfFormula};
use crate::sat::encoder::{EncodingStatistics, GridEncoder};
use crate::sat::solver_factory::UnifiedSatSolver;
use crate::symbolic::{write_symbolic, Clause};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// A rule, a grid and population bounds, ready to compile and solve
pub struct GridProblem {
    settings: Settings,
    encoder: GridEncoder,
}

impl GridProblem {
    /// Create a problem from settings, loading the configured template
    pub fn new(settings: Settings) -> Result<Self> {
        let template = settings
            .rule
            .load_template()
            .context("Failed to load rule template")?;
        Self::with_template(settings, &template)
    }

    /// Create a problem with an explicit template (useful for testing)
    pub fn with_template(settings: Settings, template: &[Clause]) -> Result<Self> {
        settings.validate().context("Invalid settings")?;
        let mut encoder = GridEncoder::new(settings.grid.equivalence, settings.grid.time());
        encoder
            .add_rule(template, settings.rule.symmetry, settings.rule.consequent.as_deref())
            .context("Failed to expand rule template")?;

        for bound in &settings.population {
            match &bound.helper {
                None => encoder.bound_population(bound.comparator, bound.size, bound.generation),
                Some(name) => encoder.bound_helper(bound.comparator, bound.size, name, bound.generation),
            }
        }

        Ok(Self { settings, encoder })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn encoder(&self) -> &GridEncoder {
        &self.encoder
    }

    pub fn encoding_statistics(&self) -> EncodingStatistics {
        self.encoder.statistics()
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        self.settings.output.root_path().with_extension(extension)
    }

    /// Number the clauses and write the `.dim` file, plus `.sym` when enabled
    pub fn compile(&self) -> Result<CnfFormula> {
        let directory = &self.settings.output.directory;
        std::fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create directory: {}", directory.display()))?;

        if self.settings.output.write_symbolic {
            let path = self.output_path("sym");
            let mut out = BufWriter::new(File::create(&path)?);
            write_symbolic(self.encoder.clauses(), &mut out)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            out.flush()?;
            info!("Wrote symbolic clauses to {}", path.display());
        }

        let formula = self.encoder.compile().context("Failed to compile clauses")?;
        let path = self.output_path("dim");
        let mut out = BufWriter::new(File::create(&path)?);
        formula
            .write(&mut out)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        out.flush()?;
        info!("Wrote DIMACS to {}", path.display());
        Ok(formula)
    }

    /// Compile, solve and decode up to `max_solutions` distinct solutions
    pub fn solve(&mut self) -> Result<Vec<Solution>> {
        let start_time = Instant::now();
        let formula = self.compile()?;
        let validator = AssignmentValidator::new(&formula);

        let mut solver = UnifiedSatSolver::new(&self.settings.solver, &self.settings.output.root_path());
        solver.add_formula(&formula).context("Failed to load clauses into solver")?;
        let found = solver
            .solve_multiple(self.settings.solver.max_solutions)
            .context("SAT solving failed")?;
        info!(
            "Found {} solutions in {:.3}s",
            found.len(),
            start_time.elapsed().as_secs_f64()
        );

        if self.settings.solver.backend == SolverBackend::Cadical {
            let first = found.first().map(|s| s.assignment.as_slice());
            let path = self.output_path("out");
            std::fs::write(&path, format_solver_output(first))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        let mut solutions = Vec::new();
        for (i, raw) in found.iter().enumerate() {
            let result = validator.validate(&raw.assignment);
            if !result.is_valid {
                warn!("Solution {} violates the formula:\n{}", i + 1, result);
                continue;
            }
            let values = decode_assignment(&formula.symbols, &raw.assignment)
                .with_context(|| format!("Failed to decode solution {}", i + 1))?;
            solutions.push(Solution::new(
                i + 1,
                values,
                self.settings.grid.equivalence.to_string(),
                formula.variable_count(),
                formula.clause_count(),
                raw.solve_time,
            ));
        }
        Ok(solutions)
    }

    /// Save each solution as `<file_root>_<n>.json`
    pub fn save_solutions(&self, solutions: &[Solution]) -> Result<Vec<PathBuf>> {
        let root = self.settings.output.root_path();
        solutions
            .iter()
            .map(|solution| {
                let path = root.with_file_name(format!(
                    "{}_{:03}.json",
                    self.settings.output.file_root, solution.index
                ));
                solution
                    .save_to_file(&path)
                    .with_context(|| format!("Failed to save {}", path.display()))?;
                Ok(path)
            })
            .collect()
    }
}
