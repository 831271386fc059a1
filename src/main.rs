//! Command line front end for the grid SAT compiler

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridsat::{
    config::{CliOverrides, Settings, SolverBackend},
    problem::GridProblem,
    sat::{
        decode_assignment, exclude_solution, load_results, write_dimacs, CadicalSolver, SatSolver, SolverCommand,
        LIFE_TEMPLATE,
    },
    symbolic::read_symbolic,
    utils::{ColorOutput, OutputFormat},
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridsat")]
#[command(about = "Compile grid neighbourhood rules to SAT and decode solutions")]
#[command(version = "0.1.0")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a grid for patterns obeying a rule
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Rule template file (overrides config)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Random seed for solvers that accept one (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum)]
        backend: Option<SolverBackend>,

        /// External solver program (overrides config)
        #[arg(long, value_enum)]
        solver: Option<SolverCommand>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Compile a symbolic clause file to DIMACS
    Compile {
        input: PathBuf,

        /// DIMACS file; defaults to the input with extension .dim
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a symbolic clause file, solve it and print the assignments
    Solve {
        input: PathBuf,

        #[arg(short, long, default_value_t = 1)]
        max_solutions: usize,

        #[arg(short, long, value_enum, default_value = "list")]
        format: OutputFormat,
    },

    /// Decode solver output using the variable comments of its DIMACS file
    Decode {
        #[arg(long)]
        dimacs_in: PathBuf,

        #[arg(long)]
        dimacs_out: PathBuf,

        #[arg(short, long, value_enum, default_value = "list")]
        format: OutputFormat,
    },

    /// Print the DIMACS file with a clause ruling out the given solution
    Exclude {
        #[arg(long)]
        dimacs_in: PathBuf,

        #[arg(long)]
        dimacs_out: PathBuf,

        /// Write here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a default configuration and the Life template
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            template,
            max_solutions,
            seed,
            backend,
            solver,
            output,
            format,
        } => {
            let overrides = CliOverrides {
                max_solutions,
                seed,
                backend,
                command: solver,
                template_file: template,
                output_dir: output,
                format,
            };
            run_command(&config, &overrides)
        }
        Commands::Compile { input, output } => compile_command(&input, output),
        Commands::Solve {
            input,
            max_solutions,
            format,
        } => solve_command(&input, max_solutions, format),
        Commands::Decode {
            dimacs_in,
            dimacs_out,
            format,
        } => decode_command(&dimacs_in, &dimacs_out, format),
        Commands::Exclude {
            dimacs_in,
            dimacs_out,
            output,
        } => exclude_command(&dimacs_in, &dimacs_out, output),
        Commands::Setup { directory, force } => setup_command(&directory, force),
    }
}

fn run_command(config_path: &Path, overrides: &CliOverrides) -> Result<()> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!("Config file {} not found, using defaults", config_path.display()))
        );
        Settings::default()
    };
    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;

    let start_time = Instant::now();
    let mut problem = GridProblem::new(settings.clone()).context("Failed to build grid problem")?;
    println!("{}", problem.encoding_statistics());

    let solutions = problem.solve().context("Failed to solve grid problem")?;
    if solutions.is_empty() {
        println!("{}", ColorOutput::warning("No solutions found"));
        return Ok(());
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Found {} solution(s) in {:.3}s",
            solutions.len(),
            start_time.elapsed().as_secs_f64()
        ))
    );
    for solution in &solutions {
        println!("\n{}", solution.format(settings.output.format));
    }

    let saved = problem.save_solutions(&solutions)?;
    println!(
        "{}",
        ColorOutput::info(&format!(
            "Saved {} solution(s) to {}",
            saved.len(),
            settings.output.directory.display()
        ))
    );
    Ok(())
}

fn read_clauses(input: &Path) -> Result<Vec<gridsat::symbolic::Clause>> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    read_symbolic(BufReader::new(file)).with_context(|| format!("Failed to parse {}", input.display()))
}

fn compile_command(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let clauses = read_clauses(input)?;
    let output = output.unwrap_or_else(|| input.with_extension("dim"));
    let mut out = BufWriter::new(
        File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    let formula = write_dimacs(&clauses, &mut out)?;
    out.flush()?;
    println!(
        "{}",
        ColorOutput::success(&format!(
            "Wrote {} variables and {} clauses to {}",
            formula.variable_count(),
            formula.clause_count(),
            output.display()
        ))
    );
    Ok(())
}

fn solve_command(input: &Path, max_solutions: usize, format: OutputFormat) -> Result<()> {
    let clauses = read_clauses(input)?;
    let dimacs = input.with_extension("dim");
    let mut out = BufWriter::new(File::create(&dimacs)?);
    let formula = write_dimacs(&clauses, &mut out)?;
    out.flush()?;

    let mut solver = CadicalSolver::new();
    solver.add_formula(&formula)?;
    let solutions = solver.solve_multiple(max_solutions)?;
    if solutions.is_empty() {
        println!("{}", ColorOutput::warning("Unsatisfiable"));
        return Ok(());
    }

    for solution in &solutions {
        let results = decode_assignment(&formula.symbols, &solution.assignment)?;
        println!("{}", ColorOutput::info("Assignments to values are:"));
        print!("{}", format.render(&results));
    }
    Ok(())
}

fn decode_command(dimacs_in: &Path, dimacs_out: &Path, format: OutputFormat) -> Result<()> {
    let cnf = File::open(dimacs_in).with_context(|| format!("Failed to open {}", dimacs_in.display()))?;
    let solution = File::open(dimacs_out).with_context(|| format!("Failed to open {}", dimacs_out.display()))?;
    let results = load_results(BufReader::new(cnf), BufReader::new(solution))
        .context("Failed to decode solver output")?;
    print!("{}", format.render(&results));
    Ok(())
}

fn exclude_command(dimacs_in: &Path, dimacs_out: &Path, output: Option<PathBuf>) -> Result<()> {
    let cnf = std::fs::read_to_string(dimacs_in).with_context(|| format!("Failed to read {}", dimacs_in.display()))?;
    let solution =
        std::fs::read_to_string(dimacs_out).with_context(|| format!("Failed to read {}", dimacs_out.display()))?;
    let excluded = exclude_solution(&cnf, &solution)?;
    match output {
        Some(path) => std::fs::write(&path, excluded).with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", excluded),
    }
    Ok(())
}

fn setup_command(directory: &Path, force: bool) -> Result<()> {
    let config_dir = directory.join("config");
    let rules_dir = directory.join("rules");
    for dir in [&config_dir, &rules_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let life_path = rules_dir.join("life.sym");
    if !life_path.exists() || force {
        std::fs::write(&life_path, LIFE_TEMPLATE)
            .with_context(|| format!("Failed to write {}", life_path.display()))?;
        println!("Created: {}", life_path.display());
    } else {
        println!("Skipped: {} (already exists)", life_path.display());
    }

    // an oscillator search using the same rule from a file
    let mut oscillator = Settings::default();
    oscillator.grid.period = 2;
    oscillator.rule.template_file = Some(PathBuf::from("rules/life.sym"));
    oscillator.output.file_root = "oscillator".to_string();
    oscillator.to_file(&config_dir.join("oscillator.yaml"))?;

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("Run: gridsat run --config {}", config_path.display());
    Ok(())
}
