//! Tessellations of the plane into rotated or reflected copies of one box

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tiling of the plane by boxes, each an image of the fundamental box at
/// the origin under one of a few affine transformations.
///
/// Face-centred variants rotate about the centre of a cell rather than a
/// vertex between cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tessellation {
    /// Square boxes with 90 degree vertex-centred rotations
    RotatedSquare { size: i64 },
    /// Square boxes with 90 degree face-centred rotations
    FaceRotatedSquare { size: i64 },
    /// Rhombus boxes with 120 degree vertex-centred rotations
    RotatedRhombus { size: i64 },
    /// Rhombus boxes with 120 degree face-centred rotations
    FaceRotatedRhombus { size: i64 },
    /// Rectangles flipped across lines between cells
    FlippedRectangle { rows: i64, columns: i64 },
    /// Rectangles flipped across lines through cell centres
    CenterFlippedRectangle { rows: i64, columns: i64 },
    /// Rectangles glued with reversed order between boundaries
    CrossSurface { rows: i64, columns: i64 },
}

impl Tessellation {
    pub fn rows(&self) -> i64 {
        match *self {
            Tessellation::RotatedSquare { size }
            | Tessellation::FaceRotatedSquare { size }
            | Tessellation::RotatedRhombus { size }
            | Tessellation::FaceRotatedRhombus { size } => size,
            Tessellation::FlippedRectangle { rows, .. }
            | Tessellation::CenterFlippedRectangle { rows, .. }
            | Tessellation::CrossSurface { rows, .. } => rows,
        }
    }

    pub fn columns(&self) -> i64 {
        match *self {
            Tessellation::RotatedSquare { size }
            | Tessellation::FaceRotatedSquare { size }
            | Tessellation::RotatedRhombus { size }
            | Tessellation::FaceRotatedRhombus { size } => size,
            Tessellation::FlippedRectangle { columns, .. }
            | Tessellation::CenterFlippedRectangle { columns, .. }
            | Tessellation::CrossSurface { columns, .. } => columns,
        }
    }

    /// Number of transformations, including the identity at label 0
    pub fn label_count(&self) -> u8 {
        match self {
            Tessellation::RotatedRhombus { .. } | Tessellation::FaceRotatedRhombus { .. } => 3,
            _ => 4,
        }
    }

    /// Apply transformation `label` to cell coordinates
    pub fn transform(&self, label: u8, i: i64, j: i64) -> (i64, i64) {
        if label == 0 {
            return (i, j);
        }
        match self {
            Tessellation::RotatedSquare { .. } | Tessellation::FaceRotatedSquare { .. } => match label {
                1 => (-j - 1, i),
                2 => (-i - 1, -j - 1),
                _ => (j, -i - 1),
            },
            Tessellation::RotatedRhombus { .. } | Tessellation::FaceRotatedRhombus { .. } => match label {
                1 => (-j - 1, i - j),
                _ => (j - i - 1, -i - 1),
            },
            Tessellation::FlippedRectangle { .. } | Tessellation::CenterFlippedRectangle { .. } => {
                match label {
                    1 => (-1 - i, j),
                    2 => (i, -1 - j),
                    _ => (-1 - i, -1 - j),
                }
            }
            Tessellation::CrossSurface { rows, columns } => match label {
                1 => (i - rows, columns - 1 - j),
                2 => (-1 - i, -1 - j),
                _ => (rows - 1 - i, j - columns),
            },
        }
    }

    /// Whether box `(bi, bj)` is a transformed copy of the fundamental box
    pub fn is_transformed(&self, bi: i64, bj: i64) -> bool {
        match self {
            Tessellation::RotatedRhombus { .. } | Tessellation::FaceRotatedRhombus { .. } => {
                (bi + bj).rem_euclid(3) != 0
            }
            _ => bi.rem_euclid(2) != 0 || bj.rem_euclid(2) != 0,
        }
    }

    /// Box containing a cell
    pub fn box_of(&self, i: i64, j: i64) -> (i64, i64) {
        (i.div_euclid(self.rows()), j.div_euclid(self.columns()))
    }

    fn recenter(&self, i: i64, j: i64, label: u8) -> (i64, i64, u8) {
        match self {
            Tessellation::FaceRotatedSquare { .. } | Tessellation::FaceRotatedRhombus { .. } => {
                // boxes are still found with vertex-centred rotations
                let (di, dj) = self.transform(label, 0, 0);
                let (i, j) = (i - di, j - dj);
                // corresponding border cells are the same cell
                let (i, j) = if i == self.rows() || j == 0 { (j, i) } else { (i, j) };
                (i, j, 0)
            }
            Tessellation::CenterFlippedRectangle { .. } => {
                let (di, dj) = self.transform(label, 0, 0);
                (i - di, j - dj, 0)
            }
            _ => (i, j, label),
        }
    }

    /// Fold any cell of the plane onto the fundamental box.
    ///
    /// Returns the representative coordinates and the label of the
    /// transformation that was applied (always 0 for face-centred variants,
    /// whose orientation is not consistent).
    pub fn to_grid(&self, i: i64, j: i64) -> (i64, i64, u8) {
        for label in 0..self.label_count() {
            let (it, jt) = self.transform(label, i, j);
            let (bi, bj) = self.box_of(it, jt);
            if !self.is_transformed(bi, bj) {
                return self.recenter(it.rem_euclid(self.rows()), jt.rem_euclid(self.columns()), label);
            }
        }
        // every cell lies in a box reached by some transformation
        (i.rem_euclid(self.rows()), j.rem_euclid(self.columns()), 0)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Tessellation::RotatedSquare { .. } => "RotatedSquare",
            Tessellation::FaceRotatedSquare { .. } => "FaceRotatedSquare",
            Tessellation::RotatedRhombus { .. } => "RotatedRhombus",
            Tessellation::FaceRotatedRhombus { .. } => "FaceRotatedRhombus",
            Tessellation::FlippedRectangle { .. } => "FlippedRectangle",
            Tessellation::CenterFlippedRectangle { .. } => "CenterFlippedRectangle",
            Tessellation::CrossSurface { .. } => "CrossSurface",
        }
    }
}

impl fmt::Display for Tessellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fundamental_box_is_fixed() {
        let tessellation = Tessellation::RotatedSquare { size: 10 };
        for i in 0..10 {
            for j in 0..10 {
                assert_eq!(tessellation.to_grid(i, j), (i, j, 0));
            }
        }
    }

    #[test]
    fn test_rotated_square_labels() {
        let tessellation = Tessellation::RotatedSquare { size: 10 };
        // box (-1, 0) maps back through the quarter turn
        assert_eq!(tessellation.to_grid(-1, 3), (3, 0, 3));
        // diagonal box (-1, -1) is the half turn
        assert_eq!(tessellation.to_grid(-1, -1), (0, 0, 2));
        assert_eq!(tessellation.to_grid(-3, -5), (2, 4, 2));
        // box (0, -1)
        assert_eq!(tessellation.to_grid(4, -1), (0, 4, 1));
    }

    #[test]
    fn test_rotated_square_is_idempotent() {
        let tessellation = Tessellation::RotatedSquare { size: 6 };
        for i in -15..15 {
            for j in -15..15 {
                let (it, jt, _) = tessellation.to_grid(i, j);
                assert!((0..6).contains(&it) && (0..6).contains(&jt));
                assert_eq!(tessellation.to_grid(it, jt), (it, jt, 0));
            }
        }
    }

    #[test]
    fn test_rhombus_covers_plane() {
        let tessellation = Tessellation::RotatedRhombus { size: 5 };
        for i in -12..12 {
            for j in -12..12 {
                let (it, jt, label) = tessellation.to_grid(i, j);
                assert!((0..5).contains(&it) && (0..5).contains(&jt));
                assert!(label < 3);
            }
        }
    }

    #[test]
    fn test_flipped_rectangle() {
        let tessellation = Tessellation::FlippedRectangle { rows: 4, columns: 6 };
        assert_eq!(tessellation.to_grid(-1, 2), (0, 2, 1));
        assert_eq!(tessellation.to_grid(2, 6), (2, 5, 2));
        assert_eq!(tessellation.to_grid(-1, -1), (0, 0, 3));
    }

    #[test]
    fn test_face_rotated_square() {
        let tessellation = Tessellation::FaceRotatedSquare { size: 6 };
        // face-centred folds drop the label
        assert_eq!(tessellation.to_grid(-1, 3), (3, 1, 0));
        assert_eq!(tessellation.to_grid(3, -1), (1, 3, 0));
        assert_eq!(tessellation.to_grid(2, 4), (2, 4, 0));
    }

    #[test]
    fn test_face_rotated_rhombus_folds_without_label() {
        let tessellation = Tessellation::FaceRotatedRhombus { size: 6 };
        for i in -10..10 {
            for j in -10..10 {
                let (_, _, label) = tessellation.to_grid(i, j);
                assert_eq!(label, 0);
            }
        }
    }

    #[test]
    fn test_center_flipped_rectangle() {
        let tessellation = Tessellation::CenterFlippedRectangle { rows: 4, columns: 6 };
        assert_eq!(tessellation.to_grid(1, 2), (1, 2, 0));
        for i in -9..9 {
            for j in -9..9 {
                assert_eq!(tessellation.to_grid(i, j).2, 0);
            }
        }
    }

    #[test]
    fn test_cross_surface() {
        let tessellation = Tessellation::CrossSurface { rows: 4, columns: 6 };
        assert_eq!(tessellation.to_grid(-1, 2), (3, 3, 1));
        assert_eq!(tessellation.transform(3, 0, 0), (3, -6));
        assert_eq!(tessellation.transform(2, 1, 1), (-2, -2));
    }
}
