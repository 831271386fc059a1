//! Symmetry expansion of neighbourhood templates

pub mod basis;
pub mod closure;

pub use basis::{Permutation, SymmetryBasis, CENTER, NEIGHBOR_SYMBOLS};
pub use closure::{all_symmetries, expand_symmetry};
