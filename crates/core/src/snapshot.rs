//! Snapshot module - read-only view of a session for renderers
//!
//! Plain data with no behavior; serializes directly to the driver's JSON frames.

use serde::Serialize;

use crate::piece::Piece;
use crate::rng::PieceSource;
use crate::session::GameSession;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Board cells, top row first
pub type Grid = [[Cell; BOARD_WIDTH]; BOARD_HEIGHT];

/// A piece as drawn: kind, color, origin and its current rotation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PieceView {
    pub kind: PieceKind,
    pub color: Cell,
    pub x: i32,
    pub y: i32,
    pub shape: Vec<Vec<Cell>>,
}

impl From<&Piece> for PieceView {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind,
            color: value.color(),
            x: value.x,
            y: value.y,
            shape: value.shape.to_rows(),
        }
    }
}

/// Everything a renderer needs to draw one frame of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionSnapshot {
    pub board: Grid,
    pub current: PieceView,
    /// Origin row of the drop shadow
    pub shadow_y: i32,
    pub next: PieceView,
    pub held: Option<PieceView>,
    pub can_hold: bool,
    pub score: u32,
    pub lines_cleared: u32,
    pub pieces_locked: u32,
    pub is_over: bool,
}

impl SessionSnapshot {
    /// Copy the session's board, pieces and totals
    pub fn capture<S: PieceSource>(session: &GameSession<S>) -> Self {
        Self {
            board: session.board().to_grid(),
            current: PieceView::from(session.current()),
            shadow_y: session.drop_row(),
            next: PieceView::from(session.next()),
            held: session.held().map(PieceView::from),
            can_hold: session.can_hold(),
            score: session.score(),
            lines_cleared: session.lines_cleared(),
            pieces_locked: session.pieces_locked(),
            is_over: session.is_over(),
        }
    }
}
