//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty (0) or holds the color
//! index (1-7) of the piece that locked there.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use crate::piece::Piece;
use crate::types::{Cell, BOARD_CELLS, BOARD_HEIGHT, BOARD_WIDTH, EMPTY};

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; BOARD_CELLS],
        }
    }

    /// Wrap a row-major cell array
    pub fn from_flat(cells: [Cell; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 || y >= BOARD_HEIGHT as i32 {
            return None;
        }
        Some((y as usize) * BOARD_WIDTH + (x as usize))
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(cell) if cell != EMPTY)
    }

    /// Whether every occupied cell of `piece` may sit where it is
    ///
    /// A cell is rejected when its column is outside the board, when it is at
    /// or below the floor, or when it overlaps a filled cell. Cells above the
    /// top edge (negative y) never collide.
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece.cells().all(|(x, y, _)| {
            if x < 0 || x >= BOARD_WIDTH as i32 || y >= BOARD_HEIGHT as i32 {
                return false;
            }
            y < 0 || !self.is_occupied(x, y)
        })
    }

    /// Copy the piece's cells into the grid
    ///
    /// Callers are expected to have checked the position already. Cells above
    /// the top edge are discarded.
    pub fn lock(&mut self, piece: &Piece) {
        for (x, y, cell) in piece.cells() {
            self.set(x, y, cell);
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT {
            return false;
        }
        let start = y * BOARD_WIDTH;
        self.cells[start..start + BOARD_WIDTH]
            .iter()
            .all(|&cell| cell != EMPTY)
    }

    /// Remove row `y`, shifting every row above it down by one and emptying
    /// the top row
    pub fn clear_row(&mut self, y: usize) {
        if y >= BOARD_HEIGHT {
            return;
        }

        // copy_within handles the overlapping ranges
        for row in (1..=y).rev() {
            let src_start = (row - 1) * BOARD_WIDTH;
            self.cells
                .copy_within(src_start..src_start + BOARD_WIDTH, row * BOARD_WIDTH);
        }

        self.cells[..BOARD_WIDTH].fill(EMPTY);
    }

    /// Clear every full row and return how many were removed
    ///
    /// Rows are scanned bottom to top. After a clear the same row index is
    /// examined again, since the shift may have moved another full row into it.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = BOARD_HEIGHT;

        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.clear_row(row);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Origin row the piece would come to rest at if dropped straight down
    ///
    /// Works on a detached copy; the given piece is never moved.
    pub fn compute_drop_row(&self, piece: &Piece) -> i32 {
        let mut probe = *piece;
        loop {
            let below = probe.translated(0, 1);
            if !self.is_valid_position(&below) {
                return probe.y;
            }
            probe = below;
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.cells
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(BOARD_WIDTH)
    }

    /// Copy into a fixed-size 2D grid
    pub fn to_grid(&self) -> [[Cell; BOARD_WIDTH]; BOARD_HEIGHT] {
        let mut grid = [[EMPTY; BOARD_WIDTH]; BOARD_HEIGHT];
        for (dst, src) in grid.iter_mut().zip(self.rows()) {
            dst.copy_from_slice(src);
        }
        grid
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Number of non-empty cells
    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c != EMPTY).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
