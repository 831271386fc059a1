//! Decoded cell values arranged by generation, row and column

use super::equivalence::Equivalence;
use crate::sat::dimacs::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Values of the cells `<name>_<i>_<j>_<t>` of a decoded solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueGrid {
    pub generations: usize,
    pub height: usize,
    pub width: usize,
    pub cells: Vec<Option<Value>>,
}

impl ValueGrid {
    /// Create a grid with no known values
    pub fn new(generations: usize, height: usize, width: usize) -> Self {
        Self {
            generations,
            height,
            width,
            cells: vec![None; generations * height * width],
        }
    }

    #[inline]
    pub fn index(&self, generation: usize, row: usize, col: usize) -> usize {
        (generation * self.height + row) * self.width + col
    }

    /// Value at coordinates, `None` when unknown or out of bounds
    pub fn get(&self, generation: usize, row: usize, col: usize) -> Option<Value> {
        if generation < self.generations && row < self.height && col < self.width {
            self.cells[self.index(generation, row, col)]
        } else {
            None
        }
    }

    /// Rows of one generation
    pub fn layer(&self, generation: usize) -> Vec<Vec<Option<Value>>> {
        (0..self.height)
            .map(|row| (0..self.width).map(|col| self.get(generation, row, col)).collect())
            .collect()
    }

    /// Count cells of a generation that are set
    pub fn living_count(&self, generation: usize) -> usize {
        self.layer(generation)
            .iter()
            .flatten()
            .filter(|value| value.is_some_and(|v| v.is_set()))
            .count()
    }

    /// View a `rows` x `columns` patch of the plane through an equivalence,
    /// so tessellated solutions show their rotated copies.
    pub fn unfold(&self, equivalence: &Equivalence, generation: usize, rows: i64, columns: i64) -> Vec<Vec<Option<Value>>> {
        (0..rows)
            .map(|i| {
                (0..columns)
                    .map(|j| {
                        let (it, jt, _) = equivalence.to_equivalent(i, j);
                        if it < 0 || jt < 0 {
                            None
                        } else {
                            self.get(generation, it as usize, jt as usize)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

fn parse_coordinates(rest: &str) -> Option<(usize, usize, usize)> {
    let mut parts = rest.split('_').map(|part| part.parse::<usize>().ok());
    let i = parts.next()??;
    let j = parts.next()??;
    let t = parts.next()??;
    if parts.next().is_some() {
        return None;
    }
    Some((i, j, t))
}

/// Collect the values of variables `<name>_<i>_<j>_<t>` into a grid.
///
/// Keys with other shapes, including negative coordinates, are skipped.
pub fn get_value_grid(name: &str, results: &[(String, Value)]) -> ValueGrid {
    let prefix = format!("{}_", name);
    let cells: Vec<(usize, usize, usize, Value)> = results
        .iter()
        .filter_map(|(key, value)| {
            let (i, j, t) = parse_coordinates(key.strip_prefix(&prefix)?)?;
            Some((i, j, t, *value))
        })
        .collect();

    if cells.is_empty() {
        return ValueGrid::new(0, 0, 0);
    }

    let height = cells.iter().map(|c| c.0).max().unwrap_or(0) + 1;
    let width = cells.iter().map(|c| c.1).max().unwrap_or(0) + 1;
    let generations = cells.iter().map(|c| c.2).max().unwrap_or(0) + 1;

    let mut grid = ValueGrid::new(generations, height, width);
    for (i, j, t, value) in cells {
        let ix = grid.index(t, i, j);
        grid.cells[ix] = Some(value);
    }
    grid
}

impl fmt::Display for ValueGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.layer(0) {
            for cell in row {
                let symbol = if cell.is_some_and(|v| v.is_set()) { '*' } else { '.' };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tessellation::Tessellation;

    fn results() -> Vec<(String, Value)> {
        vec![
            ("c_0_0_0".to_string(), Value::Bool(true)),
            ("c_0_1_0".to_string(), Value::Bool(false)),
            ("c_1_0_0".to_string(), Value::Bool(false)),
            ("c_1_1_0".to_string(), Value::Bool(true)),
            ("c_1_1_1".to_string(), Value::Bool(true)),
            ("h$c_0_0_0".to_string(), Value::Bool(true)),
            ("{x001}".to_string(), Value::Bool(true)),
        ]
    }

    #[test]
    fn test_get_value_grid() {
        let grid = get_value_grid("c", &results());
        assert_eq!((grid.generations, grid.height, grid.width), (2, 2, 2));
        assert_eq!(grid.get(0, 0, 0), Some(Value::Bool(true)));
        assert_eq!(grid.get(1, 0, 0), None);
        assert_eq!(grid.get(1, 1, 1), Some(Value::Bool(true)));
        assert_eq!(grid.living_count(0), 2);
        assert_eq!(grid.to_string(), "*.\n.*\n");
    }

    #[test]
    fn test_integer_values() {
        let results = vec![
            ("t_0_0_0".to_string(), Value::Int(3)),
            ("t_0_1_0".to_string(), Value::Int(0)),
        ];
        let grid = get_value_grid("t", &results);
        assert_eq!(grid.layer(0), vec![vec![Some(Value::Int(3)), Some(Value::Int(0))]]);
        assert!(get_value_grid("c", &results).cells.is_empty());
    }

    #[test]
    fn test_unfold_tessellation() {
        let grid = get_value_grid("c", &results());
        let square = Equivalence::Tessellated {
            tessellation: Tessellation::RotatedSquare { size: 2 },
        };
        let patch = grid.unfold(&square, 0, 4, 4);
        assert_eq!(patch.len(), 4);
        assert_eq!(patch[0][0], Some(Value::Bool(true)));
        // every cell of the patch folds back into the 2x2 box
        assert!(patch.iter().flatten().all(Option::is_some));
    }
}
