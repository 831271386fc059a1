//! Configuration settings for grid rule searches

use crate::grid::equivalence::Equivalence;
use crate::grid::node::PeriodicTimeAdjust;
use crate::grid::tessellation::Tessellation;
use crate::sat::cardinality::Comparator;
use crate::sat::encoder::life_template;
use crate::sat::solver::SolverCommand;
use crate::symbolic::{read_symbolic, Clause};
use crate::symmetry::SymmetryBasis;
use crate::utils::display::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub grid: GridConfig,
    pub rule: RuleConfig,
    #[serde(default)]
    pub population: Vec<PopulationBound>,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub equivalence: Equivalence,
    pub period: i64,
    /// Displacement `[di, dj]` after one period
    #[serde(default)]
    pub shift: [i64; 2],
}

impl GridConfig {
    pub fn time(&self) -> PeriodicTimeAdjust {
        PeriodicTimeAdjust::new(self.period, self.shift[0], self.shift[1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Symbolic template; the built-in Life rule when absent
    #[serde(default)]
    pub template_file: Option<PathBuf>,
    pub symmetry: SymmetryBasis,
    #[serde(default)]
    pub consequent: Option<String>,
}

impl RuleConfig {
    pub fn load_template(&self) -> Result<Vec<Clause>> {
        match &self.template_file {
            None => Ok(life_template()?),
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open template: {}", path.display()))?;
                read_symbolic(BufReader::new(file))
                    .with_context(|| format!("Failed to parse template: {}", path.display()))
            }
        }
    }
}

/// Bound on the live cells (or helper instances) of one generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationBound {
    pub comparator: Comparator,
    pub size: i64,
    #[serde(default)]
    pub generation: i64,
    /// Count instances of this helper variable instead of cells
    #[serde(default)]
    pub helper: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub command: SolverCommand,
    #[serde(default)]
    pub seed: Option<u64>,
    pub timeout_seconds: u64,
    pub max_solutions: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Cadical,
            command: SolverCommand::Cadical,
            seed: None,
            timeout_seconds: 300,
            max_solutions: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// In-process CaDiCaL
    Cadical,
    /// A solver program reading DIMACS files
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub file_root: String,
    pub format: OutputFormat,
    #[serde(default)]
    pub write_symbolic: bool,
}

impl OutputConfig {
    /// Output path without extension
    pub fn root_path(&self) -> PathBuf {
        self.directory.join(&self.file_root)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                equivalence: Equivalence::Tessellated {
                    tessellation: Tessellation::RotatedSquare { size: 10 },
                },
                period: 1,
                shift: [0, 0],
            },
            rule: RuleConfig {
                template_file: None,
                symmetry: SymmetryBasis::Totalistic,
                consequent: Some("G".to_string()),
            },
            population: vec![PopulationBound {
                comparator: Comparator::AtLeast,
                size: 30,
                generation: 0,
                helper: None,
            }],
            solver: SolverConfig::default(),
            output: OutputConfig {
                directory: PathBuf::from("output"),
                file_root: "stilllife".to_string(),
                format: OutputFormat::Life,
                write_symbolic: true,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.period <= 0 {
            anyhow::bail!("Period must be positive");
        }

        if self.grid.equivalence.rows() <= 0 || self.grid.equivalence.columns() <= 0 {
            anyhow::bail!("Grid dimensions must be positive: {}", self.grid.equivalence);
        }

        if self.solver.max_solutions == 0 {
            anyhow::bail!("Maximum solutions must be positive");
        }

        if let Some(template) = &self.rule.template_file {
            if !template.exists() {
                anyhow::bail!("Template file does not exist: {}", template.display());
            }
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = max_solutions;
        }
        if let Some(seed) = cli_overrides.seed {
            self.solver.seed = Some(seed);
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(command) = cli_overrides.command {
            self.solver.command = command;
        }
        if let Some(ref template) = cli_overrides.template_file {
            self.rule.template_file = Some(template.clone());
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.directory = output_dir.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub max_solutions: Option<usize>,
    pub seed: Option<u64>,
    pub backend: Option<SolverBackend>,
    pub command: Option<SolverCommand>,
    pub template_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}
