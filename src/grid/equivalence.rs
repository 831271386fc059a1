//! Equivalence maps folding the infinite grid onto a finite representative set

use super::tessellation::Tessellation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How cells of the unbounded plane are identified with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Equivalence {
    /// Wrap rows and columns; each wrap through the rows shifts columns by
    /// `column_shift`.
    Toroidal {
        rows: i64,
        columns: i64,
        #[serde(default)]
        column_shift: i64,
    },
    /// Bounded grid, every cell outside the bounds is dead
    Open { rows: i64, columns: i64 },
    /// Wrapped on columns, open on rows
    Strip { rows: i64, columns: i64 },
    /// Quotient by a tessellation of rotated or reflected boxes
    Tessellated { tessellation: Tessellation },
}

impl Equivalence {
    pub fn rows(&self) -> i64 {
        match *self {
            Equivalence::Toroidal { rows, .. }
            | Equivalence::Open { rows, .. }
            | Equivalence::Strip { rows, .. } => rows,
            Equivalence::Tessellated { tessellation } => tessellation.rows(),
        }
    }

    pub fn columns(&self) -> i64 {
        match *self {
            Equivalence::Toroidal { columns, .. }
            | Equivalence::Open { columns, .. }
            | Equivalence::Strip { columns, .. } => columns,
            Equivalence::Tessellated { tessellation } => tessellation.columns(),
        }
    }

    /// Canonical coordinates of `(i, j)` and the orientation label of the fold.
    pub fn to_equivalent(&self, i: i64, j: i64) -> (i64, i64, u8) {
        match *self {
            Equivalence::Toroidal {
                rows,
                columns,
                column_shift,
            } => (
                i.rem_euclid(rows),
                (j + column_shift * i.div_euclid(rows)).rem_euclid(columns),
                0,
            ),
            Equivalence::Open { .. } => (i, j, 0),
            Equivalence::Strip { columns, .. } => (i, j.rem_euclid(columns), 0),
            Equivalence::Tessellated { tessellation } => tessellation.to_grid(i, j),
        }
    }

    /// Whether canonical coordinates lie in the dead region
    pub fn is_outside(&self, i: i64, j: i64) -> bool {
        match *self {
            Equivalence::Open { rows, columns } => i < 0 || i >= rows || j < 0 || j >= columns,
            Equivalence::Strip { rows, .. } => i < 0 || i >= rows,
            Equivalence::Toroidal { .. } | Equivalence::Tessellated { .. } => false,
        }
    }
}

impl fmt::Display for Equivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Equivalence::Toroidal {
                rows,
                columns,
                column_shift,
            } => {
                if column_shift != 0 {
                    write!(f, "{}X{}{:+}t", rows, columns, column_shift)
                } else {
                    write!(f, "{}X{}t", rows, columns)
                }
            }
            Equivalence::Open { rows, columns } => write!(f, "{}X{}o", rows, columns),
            Equivalence::Strip { rows, columns } => write!(f, "{}X{}s", rows, columns),
            Equivalence::Tessellated { tessellation } => write!(
                f,
                "{}X{}:{}",
                tessellation.rows(),
                tessellation.columns(),
                tessellation
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toroidal_wrap() {
        let torus = Equivalence::Toroidal {
            rows: 5,
            columns: 5,
            column_shift: 0,
        };
        assert_eq!(torus.to_equivalent(-1, 5), (4, 0, 0));
        assert_eq!(torus.to_equivalent(7, -6), (2, 4, 0));
        assert!(!torus.is_outside(-1, -1));
    }

    #[test]
    fn test_toroidal_shear() {
        let torus = Equivalence::Toroidal {
            rows: 4,
            columns: 6,
            column_shift: 1,
        };
        // one wrap down adds one column
        assert_eq!(torus.to_equivalent(4, 0), (0, 1, 0));
        // one wrap up subtracts one column
        assert_eq!(torus.to_equivalent(-1, 0), (3, 5, 0));
        assert_eq!(torus.to_string(), "4X6+1t");
    }

    #[test]
    fn test_open_and_strip() {
        let open = Equivalence::Open { rows: 3, columns: 4 };
        assert_eq!(open.to_equivalent(-1, 7), (-1, 7, 0));
        assert!(open.is_outside(-1, 0));
        assert!(open.is_outside(0, 4));
        assert!(!open.is_outside(2, 3));

        let strip = Equivalence::Strip { rows: 3, columns: 4 };
        assert_eq!(strip.to_equivalent(1, -1), (1, 3, 0));
        assert!(strip.is_outside(3, 0));
        assert!(!strip.is_outside(0, 100));
    }

    #[test]
    fn test_deserialize_tessellated() {
        let yaml = "kind: tessellated\ntessellation:\n  kind: rotated_square\n  size: 10\n";
        let equivalence: Equivalence = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            equivalence,
            Equivalence::Tessellated {
                tessellation: Tessellation::RotatedSquare { size: 10 }
            }
        );
        assert_eq!(equivalence.to_string(), "10X10:RotatedSquare");
    }
}
