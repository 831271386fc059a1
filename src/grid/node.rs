//! Cells of a quotient grid with Moore neighbourhoods

use super::equivalence::Equivalence;
use crate::symbolic::Atom;
use crate::symmetry::NEIGHBOR_SYMBOLS;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Symbol for the same cell one generation later
pub const NEXT_GENERATION: &str = "G";

/// Time advance: after `period` generations the pattern reappears shifted
/// by `(ishift, jshift)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicTimeAdjust {
    pub period: i64,
    #[serde(default)]
    pub ishift: i64,
    #[serde(default)]
    pub jshift: i64,
}

impl PeriodicTimeAdjust {
    pub fn new(period: i64, ishift: i64, jshift: i64) -> Self {
        Self {
            period,
            ishift,
            jshift,
        }
    }

    pub fn adjust(&self, i: i64, j: i64, t: i64) -> (i64, i64, i64) {
        if t == self.period {
            (i + self.ishift, j + self.jshift, 0)
        } else {
            (i, j, t)
        }
    }
}

impl Default for PeriodicTimeAdjust {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for PeriodicTimeAdjust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.period)
    }
}

/// Unit displacement of a compass symbol
pub fn moore_displacement(symbol: &str) -> Option<(i64, i64)> {
    match symbol {
        "N" => Some((-1, 0)),
        "NE" => Some((-1, 1)),
        "E" => Some((0, 1)),
        "SE" => Some((1, 1)),
        "S" => Some((1, 0)),
        "SW" => Some((1, -1)),
        "W" => Some((0, -1)),
        "NW" => Some((-1, -1)),
        _ => None,
    }
}

/// A cell `(i, j)` at generation `t` of a quotient grid.
///
/// Equality, hashing and ordering use the position only. The orientation
/// records which fold of the plane produced the node.
#[derive(Debug, Clone, Copy)]
pub struct GridNode {
    position: (i64, i64, i64),
    orientation: u8,
    equivalence: Equivalence,
    time: PeriodicTimeAdjust,
}

impl GridNode {
    pub fn new(position: (i64, i64, i64), equivalence: Equivalence, time: PeriodicTimeAdjust) -> Self {
        Self {
            position,
            orientation: 0,
            equivalence,
            time,
        }
    }

    pub fn position(&self) -> (i64, i64, i64) {
        self.position
    }

    pub fn generation(&self) -> i64 {
        self.position.2
    }

    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    pub fn equivalence(&self) -> &Equivalence {
        &self.equivalence
    }

    pub fn neighbor_symbols(&self) -> &'static [&'static str] {
        &NEIGHBOR_SYMBOLS
    }

    /// Neighbour in direction `symbol`, folded back onto the quotient grid
    pub fn neighbor(&self, symbol: &str) -> Option<GridNode> {
        let (i, j, t) = self.position;
        let (i, j, t) = if symbol == NEXT_GENERATION {
            self.time.adjust(i, j, t + 1)
        } else {
            let (di, dj) = moore_displacement(symbol)?;
            (i + di, j + dj, t)
        };
        Some(self.make_node(i, j, t))
    }

    pub fn neighbors(&self) -> Vec<GridNode> {
        self.neighbor_symbols()
            .iter()
            .filter_map(|symbol| self.neighbor(symbol))
            .collect()
    }

    /// Follow a path of neighbour symbols
    pub fn go(&self, path: &[&str]) -> Option<GridNode> {
        path.iter().try_fold(*self, |node, symbol| node.neighbor(symbol))
    }

    fn make_node(&self, i: i64, j: i64, t: i64) -> GridNode {
        let (i, j, orientation) = self.equivalence.to_equivalent(i, j);
        GridNode {
            position: (i, j, t),
            orientation,
            ..*self
        }
    }

    /// Canonical nodes for every cell of a rectangle at generation `t`
    pub fn grid_range(&self, imin: i64, jmin: i64, imax: i64, jmax: i64, t: i64) -> BTreeSet<GridNode> {
        (imin..imax)
            .flat_map(|i| (jmin..jmax).map(move |j| (i, j)))
            .map(|(i, j)| self.make_node(i, j, t))
            .collect()
    }

    pub fn is_outside(&self) -> bool {
        let (i, j, _) = self.position;
        self.equivalence.is_outside(i, j)
    }

    /// Outside, but next to at least one inside cell
    pub fn is_boundary(&self) -> bool {
        self.is_outside() && !self.neighbors().iter().all(GridNode::is_outside)
    }

    /// Variable name `c_<i>_<j>_<t>`
    pub fn name(&self) -> String {
        let (i, j, t) = self.position;
        format!("c_{}_{}_{}", i, j, t)
    }
}

impl PartialEq for GridNode {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for GridNode {}

impl Hash for GridNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

impl Ord for GridNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position.cmp(&other.position)
    }
}

impl PartialOrd for GridNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if self.orientation != 0 {
            write!(f, "({})", self.orientation)?;
        }
        write!(f, ":{}", self.equivalence)
    }
}

impl Atom for GridNode {
    fn atom_name(&self) -> Cow<'_, str> {
        Cow::Owned(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tessellation::Tessellation;

    fn torus(rows: i64, columns: i64) -> Equivalence {
        Equivalence::Toroidal {
            rows,
            columns,
            column_shift: 0,
        }
    }

    #[test]
    fn test_neighbors_wrap() {
        let node = GridNode::new((0, 0, 0), torus(5, 5), PeriodicTimeAdjust::default());
        assert_eq!(node.neighbor("N").unwrap().position(), (4, 0, 0));
        assert_eq!(node.neighbor("SW").unwrap().position(), (1, 4, 0));
        assert_eq!(node.neighbors().len(), 9);
        assert!(node.neighbor("X").is_none());
    }

    #[test]
    fn test_time_advance() {
        let still = GridNode::new((2, 2, 0), torus(5, 5), PeriodicTimeAdjust::default());
        assert_eq!(still.neighbor("G").unwrap().position(), (2, 2, 0));

        let glider = PeriodicTimeAdjust::new(4, 1, 1);
        let node = GridNode::new((2, 2, 0), torus(5, 5), glider);
        assert_eq!(node.neighbor("G").unwrap().position(), (2, 2, 1));
        let last = GridNode::new((2, 2, 3), torus(5, 5), glider);
        assert_eq!(last.neighbor("G").unwrap().position(), (3, 3, 0));
        assert_eq!(node.go(&["G", "G", "G", "G"]).unwrap().position(), (3, 3, 0));
    }

    #[test]
    fn test_boundary() {
        let open = Equivalence::Open { rows: 3, columns: 3 };
        let time = PeriodicTimeAdjust::default();
        assert!(!GridNode::new((0, 0, 0), open, time).is_boundary());
        assert!(GridNode::new((-1, -1, 0), open, time).is_boundary());
        assert!(!GridNode::new((-2, 0, 0), open, time).is_boundary());
    }

    #[test]
    fn test_orientation_from_tessellation() {
        let square = Equivalence::Tessellated {
            tessellation: Tessellation::RotatedSquare { size: 4 },
        };
        let node = GridNode::new((0, 2, 0), square, PeriodicTimeAdjust::default());
        let north = node.neighbor("N").unwrap();
        assert_eq!(north.position(), (2, 0, 0));
        assert_eq!(north.orientation(), 3);
        assert_eq!(north.name(), "c_2_0_0");
    }

    #[test]
    fn test_identity_by_position() {
        let time = PeriodicTimeAdjust::default();
        let a = GridNode::new((1, 2, 0), torus(5, 5), time);
        let b = GridNode::new((1, 2, 0), Equivalence::Open { rows: 5, columns: 5 }, time);
        assert_eq!(a, b);
        assert_eq!(a.to_literal().name(), "c_1_2_0");
        assert!(a.to_literal().polarity());
        assert_eq!(a.grid_range(-1, -1, 6, 6, 0).len(), 25);
    }
}
