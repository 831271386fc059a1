//! Quotient grids, their cells and template instantiation

pub mod builder;
pub mod equivalence;
pub mod node;
pub mod template;
pub mod tessellation;
pub mod values;

pub use builder::{bound_helper, bound_population, build_grid, grid_layer};
pub use equivalence::Equivalence;
pub use node::{GridNode, PeriodicTimeAdjust};
pub use template::{
    grid_substitution, identity_adjust, inflate_grid_template, inflate_template, rotation_adjust, Substitution,
};
pub use tessellation::Tessellation;
pub use values::{get_value_grid, ValueGrid};
