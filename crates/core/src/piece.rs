//! Piece module - the live falling piece
//!
//! A piece is a shape placed at an origin (the grid coordinate of the shape's
//! top-left cell). Movement and rotation here are pure transforms; whether the
//! result is legal is decided by [`Board::is_valid_position`](crate::Board::is_valid_position).

use crate::shape::Shape;
use crate::types::{Cell, PieceKind, SPAWN_X, SPAWN_Y};

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Create a piece of the given kind at the spawn origin
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: Shape::of(kind),
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Color index painted into the board on lock
    pub fn color(&self) -> Cell {
        self.kind.color_index()
    }

    /// Shift the origin; no validity check
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Copy of this piece shifted by (dx, dy)
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        let mut moved = *self;
        moved.translate(dx, dy);
        moved
    }

    pub fn rotate_clockwise(&mut self) {
        self.shape = self.shape.rotate_cw();
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.shape = self.shape.rotate_ccw();
    }

    /// Put the origin back at the spawn position, keeping the shape as is
    pub fn reset_origin(&mut self) {
        self.x = SPAWN_X;
        self.y = SPAWN_Y;
    }

    /// Absolute grid coordinates of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.shape
            .occupied()
            .map(move |(dx, dy, cell)| (self.x + dx, self.y + dy, cell))
    }
}
