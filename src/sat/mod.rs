//! CNF compilation and SAT solving for grid rules

pub mod cardinality;
pub mod dimacs;
pub mod encoder;
pub mod solver;
pub mod solver_factory;
pub mod tags;
pub mod variables;

pub use cardinality::{Cardinality, Comparator};
pub use dimacs::{
    compile_cnf, decode_assignment, exclude_solution, load_results, minimize_clauses, parse_assignment,
    write_dimacs, CnfFormula, Value,
};
pub use encoder::{life_template, EncodingStatistics, GridEncoder, LIFE_TEMPLATE};
pub use solver::{CadicalSolver, ExternalSolver, SatSolver, SolverCommand, SolverSolution};
pub use solver_factory::UnifiedSatSolver;
pub use variables::{SymbolTable, TempVars};
