//! Grid SAT compiler
//!
//! Compiles symbolic neighbourhood rules over periodic, open and tessellated
//! grids into DIMACS CNF, solves them and decodes the solutions. The classic
//! use is searching for still lifes and oscillators of Life-like automata.

pub mod config;
pub mod error;
pub mod grid;
pub mod problem;
pub mod sat;
pub mod symbolic;
pub mod symmetry;
pub mod utils;

pub use config::Settings;
pub use error::{CompileError, Result};
pub use problem::{GridProblem, Solution};

/// Run the search described by `settings`
pub fn solve_grid(settings: Settings) -> anyhow::Result<Vec<Solution>> {
    let mut problem = GridProblem::new(settings)?;
    problem.solve()
}
