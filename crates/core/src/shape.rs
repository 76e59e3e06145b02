//! Shape module - immutable piece matrices and their rotations
//!
//! A shape is a small row-major matrix of cells (at most 4x4). Zero is an empty
//! cell, non-zero is an occupied cell carrying the piece's color index.
//! Rotation never mutates a shape; it returns a new matrix with the
//! dimensions swapped (an MxN matrix rotates to NxM).

use crate::types::{Cell, PieceKind, EMPTY};

/// Largest side of any shape matrix
pub const MAX_SIDE: usize = 4;

/// Immutable shape matrix
///
/// Cells are packed row-major with a stride of `width`; slots past
/// `width * height` are always zero so derived equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    cells: [Cell; MAX_SIDE * MAX_SIDE],
}

impl Shape {
    /// Canonical spawn shape for a piece kind
    pub fn of(kind: PieceKind) -> Self {
        let c = kind.color_index();
        match kind {
            PieceKind::I => Self::packed(4, 1, &[c, c, c, c]),
            PieceKind::J => Self::packed(3, 2, &[c, 0, 0, c, c, c]),
            PieceKind::L => Self::packed(3, 2, &[0, 0, c, c, c, c]),
            PieceKind::O => Self::packed(2, 2, &[c, c, c, c]),
            PieceKind::S => Self::packed(3, 2, &[0, c, c, c, c, 0]),
            PieceKind::T => Self::packed(3, 2, &[0, c, 0, c, c, c]),
            PieceKind::Z => Self::packed(3, 2, &[c, c, 0, 0, c, c]),
        }
    }

    fn packed(width: u8, height: u8, flat: &[Cell]) -> Self {
        let mut cells = [EMPTY; MAX_SIDE * MAX_SIDE];
        cells[..flat.len()].copy_from_slice(flat);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Cell at (col, row); empty when outside the matrix
    pub fn get(&self, col: usize, row: usize) -> Cell {
        if col >= self.width() || row >= self.height() {
            return EMPTY;
        }
        self.cells[row * self.width() + col]
    }

    /// Iterate over matrix rows
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells[..self.width() * self.height()].chunks(self.width())
    }

    /// Iterate over occupied cells as `(dx, dy, cell)` offsets from the origin
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        let width = self.width();
        self.cells[..width * self.height()]
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell != EMPTY)
            .map(move |(i, &cell)| ((i % width) as i32, (i / width) as i32, cell))
    }

    /// Copy the matrix out as nested rows
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Rotate 90° clockwise: `rotated[c][h - 1 - r] = self[r][c]`
    pub fn rotate_cw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let mut cells = [EMPTY; MAX_SIDE * MAX_SIDE];
        // The rotated matrix is h columns wide.
        for r in 0..h {
            for c in 0..w {
                cells[c * h + (h - 1 - r)] = self.cells[r * w + c];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }

    /// Rotate 90° counter-clockwise: `rotated[w - 1 - c][r] = self[r][c]`
    pub fn rotate_ccw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let mut cells = [EMPTY; MAX_SIDE * MAX_SIDE];
        for r in 0..h {
            for c in 0..w {
                cells[(w - 1 - c) * h + r] = self.cells[r * w + c];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }
}
