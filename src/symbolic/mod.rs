//! Literal and clause algebra plus the symbolic text format

pub mod clause;
pub mod literal;
pub mod text;

pub use clause::{
    collect_literals, collect_variables, expand_disjunction, find_true_tuples, flatten_disjunction,
    is_tautology, remove_redundant, Clause,
};
pub use literal::{Atom, Literal, ZERO_NAME};
pub use text::{clause_to_string, parse_line, parse_lines, parse_literals, read_symbolic, write_symbolic};
