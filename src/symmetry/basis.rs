//! Permutations of neighbour symbols and the standard symmetry bases

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Neighbour symbol names: compass directions around the centre cell `O`,
/// plus `G` for the same cell one generation later.
pub const CENTER: &str = "O";
pub const NEIGHBOR_SYMBOLS: [&str; 9] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW", "G"];

/// One generator of a symmetry group, mapping symbol to symbol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Permutation {
    mapping: BTreeMap<String, String>,
}

impl Permutation {
    /// Build a permutation from disjoint cycles, each symbol mapping to the next.
    pub fn from_cycles(cycles: &[&[&str]]) -> Self {
        let mut mapping = BTreeMap::new();
        for cycle in cycles {
            let n = cycle.len();
            for i in 0..n {
                mapping.insert(cycle[i].to_string(), cycle[(i + 1) % n].to_string());
            }
        }
        Self { mapping }
    }

    /// Image of a symbol; symbols outside the domain are fixed.
    pub fn apply<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.mapping.get(symbol).map(String::as_str).unwrap_or(symbol)
    }

    pub fn inverse(&self) -> Self {
        Self {
            mapping: self
                .mapping
                .iter()
                .map(|(from, to)| (to.clone(), from.clone()))
                .collect(),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.mapping.contains_key(symbol)
    }
}

pub fn rotate_clockwise() -> Permutation {
    Permutation::from_cycles(&[&["NE", "SE", "SW", "NW"], &["N", "E", "S", "W"]])
}

pub fn rotate_clockwise_hex() -> Permutation {
    Permutation::from_cycles(&[&["NW", "N", "E", "SE", "S", "W"]])
}

pub fn rotate_180_hex() -> Permutation {
    Permutation::from_cycles(&[&["NW", "SE"], &["N", "S"], &["E", "W"]])
}

pub fn mix_corners() -> Permutation {
    Permutation::from_cycles(&[&["NE", "SE"]])
}

pub fn mix_sides() -> Permutation {
    Permutation::from_cycles(&[&["N", "E"]])
}

pub fn mix_corners_sides() -> Permutation {
    Permutation::from_cycles(&[&["NW", "N"]])
}

pub fn flip_diagonal() -> Permutation {
    Permutation::from_cycles(&[&["N", "E"], &["NW", "SE"], &["W", "S"]])
}

pub fn rotate_tri_below() -> Permutation {
    Permutation::from_cycles(&[&[CENTER, "W", "S"]])
}

pub fn rotate_tri_above() -> Permutation {
    Permutation::from_cycles(&[&[CENTER, "E", "N"]])
}

/// Named symmetry bases for square and hex neighbourhoods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryBasis {
    /// No symmetry: templates are used as written
    Identity,
    Rotated,
    RotatedHex,
    #[serde(rename = "rotated_180_hex")]
    Rotated180Hex,
    RotatedFlipped,
    RotatedFlippedHex,
    SemiTotalistic,
    Totalistic,
    TotalisticHex,
    RotatedTriBelow,
    RotatedTriAbove,
}

impl SymmetryBasis {
    /// Generators of the group
    pub fn generators(self) -> Vec<Permutation> {
        match self {
            SymmetryBasis::Identity => Vec::new(),
            SymmetryBasis::Rotated => vec![rotate_clockwise()],
            SymmetryBasis::RotatedHex => vec![rotate_clockwise_hex()],
            SymmetryBasis::Rotated180Hex => vec![rotate_180_hex()],
            SymmetryBasis::RotatedFlipped => vec![rotate_clockwise(), flip_diagonal()],
            SymmetryBasis::RotatedFlippedHex => vec![rotate_clockwise_hex(), flip_diagonal()],
            SymmetryBasis::SemiTotalistic => vec![rotate_clockwise(), mix_corners(), mix_sides()],
            SymmetryBasis::Totalistic => vec![rotate_clockwise(), mix_corners(), mix_corners_sides()],
            SymmetryBasis::TotalisticHex => vec![rotate_clockwise_hex(), mix_corners_sides()],
            SymmetryBasis::RotatedTriBelow => vec![rotate_tri_below()],
            SymmetryBasis::RotatedTriAbove => vec![rotate_tri_above()],
        }
    }
}
