//! Grid problem definition, solutions and their validation

#[allow(clippy::module_inception)]
pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::GridProblem;
pub use solution::{Solution, SolutionMetadata};
pub use validator::{AssignmentValidator, ValidationResult};
