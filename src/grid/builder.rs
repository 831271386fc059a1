//! Breadth-first construction of quotient grids and population bounds

use super::node::GridNode;
use crate::sat::cardinality::Comparator;
use crate::sat::variables::TempVars;
use crate::symbolic::{Clause, Literal};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// All canonical nodes reachable from `root`, sorted by position.
///
/// A neighbour joins the grid when it is unseen, has orientation 0 and is
/// either inside or a boundary cell.
pub fn build_grid(root: GridNode) -> Vec<GridNode> {
    let mut frontier = VecDeque::from([root]);
    let mut seen: HashSet<GridNode> = HashSet::from([root]);

    while let Some(node) = frontier.pop_front() {
        for neighbor in node.neighbors() {
            if !seen.contains(&neighbor)
                && neighbor.orientation() == 0
                && (!neighbor.is_outside() || neighbor.is_boundary())
            {
                seen.insert(neighbor);
                frontier.push_back(neighbor);
            }
        }
    }

    let mut grid: Vec<GridNode> = seen.into_iter().collect();
    grid.sort();
    debug!("Built grid of {} nodes from {}", grid.len(), root);
    grid
}

/// Inside nodes of generation `t`
pub fn grid_layer(grid: &[GridNode], t: i64) -> Vec<GridNode> {
    grid.iter()
        .filter(|node| node.generation() == t && !node.is_outside())
        .copied()
        .collect()
}

fn bound_cardinality(
    grid: &[GridNode],
    comparator: Comparator,
    size: i64,
    generation: i64,
    prefix: &str,
    temps: &mut TempVars,
) -> Vec<Clause> {
    let variables = grid_layer(grid, generation)
        .iter()
        .map(|node| Literal::new(format!("{}{}", prefix, node.name())))
        .collect();
    let cardinality = comparator.build(variables, size, temps);

    let mut clauses = vec![Clause::comment(format!(
        "Population constraint {} {}",
        comparator, size
    ))];
    clauses.extend(cardinality.clauses().cloned().map(Clause::Disjunction));
    clauses
}

/// Bound the number of live cells in one generation.
pub fn bound_population(
    grid: &[GridNode],
    comparator: Comparator,
    size: i64,
    generation: i64,
    temps: &mut TempVars,
) -> Vec<Clause> {
    bound_cardinality(grid, comparator, size, generation, "", temps)
}

/// Bound the number of true instances of helper variable `name` in one generation.
pub fn bound_helper(
    grid: &[GridNode],
    comparator: Comparator,
    size: i64,
    name: &str,
    generation: i64,
    temps: &mut TempVars,
) -> Vec<Clause> {
    bound_cardinality(grid, comparator, size, generation, &format!("{}$", name), temps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::equivalence::Equivalence;
    use crate::grid::node::PeriodicTimeAdjust;
    use crate::grid::tessellation::Tessellation;

    fn grid_for(equivalence: Equivalence, time: PeriodicTimeAdjust) -> Vec<GridNode> {
        build_grid(GridNode::new((0, 0, 0), equivalence, time))
    }

    #[test]
    fn test_open_grid() {
        let grid = grid_for(Equivalence::Open { rows: 10, columns: 10 }, PeriodicTimeAdjust::default());
        assert_eq!(grid.len(), 144);
        assert_eq!(grid.iter().filter(|n| !n.is_outside()).count(), 100);
        assert!(grid.iter().filter(|n| n.is_outside()).all(GridNode::is_boundary));
        assert_eq!(grid_layer(&grid, 0).len(), 100);
        // sorted by position
        assert_eq!(grid[0].position(), (-1, -1, 0));
    }

    #[test]
    fn test_toroidal_grid() {
        let grid = grid_for(
            Equivalence::Toroidal {
                rows: 5,
                columns: 5,
                column_shift: 0,
            },
            PeriodicTimeAdjust::default(),
        );
        assert_eq!(grid.len(), 25);
        for node in &grid {
            assert!(!node.is_outside());
            for neighbor in node.neighbors() {
                assert!(grid.contains(&neighbor));
            }
        }
    }

    #[test]
    fn test_periodic_grid_has_every_generation() {
        let grid = grid_for(
            Equivalence::Toroidal {
                rows: 4,
                columns: 4,
                column_shift: 0,
            },
            PeriodicTimeAdjust::new(3, 0, 1),
        );
        assert_eq!(grid.len(), 48);
        for t in 0..3 {
            assert_eq!(grid_layer(&grid, t).len(), 16);
        }
    }

    #[test]
    fn test_tessellated_grid() {
        let grid = grid_for(
            Equivalence::Tessellated {
                tessellation: Tessellation::RotatedSquare { size: 10 },
            },
            PeriodicTimeAdjust::default(),
        );
        assert_eq!(grid.len(), 100);
        assert!(grid.iter().all(|n| n.orientation() == 0));
    }

    #[test]
    fn test_other_tessellated_grids() {
        let cases = [
            (Tessellation::FaceRotatedSquare { size: 6 }, 38),
            (Tessellation::FaceRotatedRhombus { size: 6 }, 38),
            (Tessellation::CenterFlippedRectangle { rows: 4, columns: 6 }, 35),
            (Tessellation::CrossSurface { rows: 4, columns: 6 }, 24),
        ];
        for (tessellation, expected) in cases {
            let grid = grid_for(Equivalence::Tessellated { tessellation }, PeriodicTimeAdjust::default());
            assert_eq!(grid.len(), expected, "{}", tessellation);
        }
    }

    #[test]
    fn test_strip_grid() {
        let grid = grid_for(Equivalence::Strip { rows: 3, columns: 4 }, PeriodicTimeAdjust::default());
        // 3 inside rows plus one boundary row above and below
        assert_eq!(grid.len(), 20);
        assert_eq!(grid_layer(&grid, 0).len(), 12);
    }

    #[test]
    fn test_bound_population() {
        let grid = grid_for(
            Equivalence::Toroidal {
                rows: 3,
                columns: 3,
                column_shift: 0,
            },
            PeriodicTimeAdjust::default(),
        );
        let mut temps = TempVars::new();
        let clauses = bound_population(&grid, Comparator::AtLeast, 4, 0, &mut temps);
        assert_eq!(clauses[0], Clause::comment("Population constraint GreaterThanOrEqual 4"));
        assert!(temps.issued() > 0);
        // inputs are negated cell literals
        assert!(clauses
            .iter()
            .filter_map(Clause::literals)
            .flatten()
            .any(|l| l.name() == "c_0_0_0"));

        let helper = bound_helper(&grid, Comparator::AtMost, 2, "h", 0, &mut temps);
        assert_eq!(helper[0], Clause::comment("Population constraint LessThanOrEqual 2"));
        assert!(helper
            .iter()
            .filter_map(Clause::literals)
            .flatten()
            .any(|l| l.name() == "h$c_2_2_0"));
    }
}
