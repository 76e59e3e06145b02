//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data, usable from the simulation, the network
//! codec and any driver.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn origin**: (3, 0), the top-left cell of the piece's shape matrix
//!
//! # Cell Encoding
//!
//! A cell is a small integer: `0` is empty, `1..=7` is occupied and doubles
//! as the color index of the piece kind that filled it. The same encoding is
//! used on the wire.
//!
//! # Examples
//!
//! ```
//! use falling_blocks_types::{Command, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::O.color_index(), 4);
//! assert_eq!(PieceKind::from_color_index(4), Some(PieceKind::O));
//!
//! assert_eq!(Command::from_str("hardDrop"), Some(Command::HardDrop));
//! assert_eq!(Command::from_str("left"), Some(Command::MoveLeft));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::Serialize;

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: usize = 20;

/// Total number of cells on the board
pub const BOARD_CELLS: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// Spawn column of a new piece's top-left shape cell
pub const SPAWN_X: i32 = 3;

/// Spawn row of a new piece's top-left shape cell
pub const SPAWN_Y: i32 = 0;

/// Default gravity interval: one row per second
pub const FALL_INTERVAL_MS: u64 = 1000;

/// Default TCP port of the broadcast hub
pub const DEFAULT_HUB_PORT: u16 = 5000;

/// Column offsets tried, in order, when a rotation lands in an invalid position
pub const WALL_KICKS: [i32; 6] = [-1, 1, -2, 2, -3, 3];

/// Line clear scoring table, indexed by lines cleared in one lock
///
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// A cell on the game board (0 = empty, 1-7 = color index)
pub type Cell = u8;

/// Empty cell value
pub const EMPTY: Cell = 0;

/// The seven piece kinds, in color-index order
///
/// - **I** (1): 1x4 bar
/// - **J** (2)
/// - **L** (3)
/// - **O** (4): 2x2 square
/// - **S** (5)
/// - **T** (6)
/// - **Z** (7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds, ordered by color index
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Fixed color index (1-7) painted into the board when this kind locks
    pub fn color_index(&self) -> Cell {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    /// Inverse of [`PieceKind::color_index`]
    pub fn from_color_index(index: Cell) -> Option<Self> {
        match index {
            1..=7 => Some(Self::ALL[(index - 1) as usize]),
            _ => None,
        }
    }
}

/// Discrete requests a driver can issue to a game session
///
/// Every command is zero-argument. Commands that make no sense in the current
/// state (movement after game over, a second hold before a lock) are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Move piece one column left
    MoveLeft,
    /// Move piece one column right
    MoveRight,
    /// Move piece one row down, locking it if it cannot move
    SoftDown,
    /// Rotate piece clockwise, with column kicks
    Rotate,
    /// Drop piece to the lowest valid row and lock it
    HardDrop,
    /// Swap the current piece with the held one (once per drop)
    Hold,
    /// Gravity step; same effect as `SoftDown`
    Tick,
    /// Start a fresh game
    Restart,
}

impl Command {
    /// Parse a command name (case-insensitive)
    ///
    /// Accepts both the short driver names and the camel-case names.
    ///
    /// # Examples
    ///
    /// ```
    /// use falling_blocks_types::Command;
    ///
    /// assert_eq!(Command::from_str("rotate"), Some(Command::Rotate));
    /// assert_eq!(Command::from_str("softDown"), Some(Command::SoftDown));
    /// assert_eq!(Command::from_str("DOWN"), Some(Command::SoftDown));
    /// assert_eq!(Command::from_str("jump"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "moveleft" => Some(Command::MoveLeft),
            "right" | "moveright" => Some(Command::MoveRight),
            "down" | "softdown" => Some(Command::SoftDown),
            "rotate" => Some(Command::Rotate),
            "drop" | "harddrop" => Some(Command::HardDrop),
            "hold" => Some(Command::Hold),
            "tick" => Some(Command::Tick),
            "restart" => Some(Command::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::SoftDown => "softDown",
            Command::Rotate => "rotate",
            Command::HardDrop => "hardDrop",
            Command::Hold => "hold",
            Command::Tick => "tick",
            Command::Restart => "restart",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_indices_are_one_through_seven() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.color_index() as usize, i + 1);
            assert_eq!(PieceKind::from_color_index(kind.color_index()), Some(*kind));
        }
        assert_eq!(PieceKind::from_color_index(0), None);
        assert_eq!(PieceKind::from_color_index(8), None);
    }

    #[test]
    fn command_names_parse_back() {
        let all = [
            Command::MoveLeft,
            Command::MoveRight,
            Command::SoftDown,
            Command::Rotate,
            Command::HardDrop,
            Command::Hold,
            Command::Tick,
            Command::Restart,
        ];
        for cmd in all {
            assert_eq!(Command::from_str(cmd.as_str()), Some(cmd));
        }
    }

    #[test]
    fn line_scores_table() {
        assert_eq!(LINE_SCORES, [0, 100, 300, 500, 800]);
        assert_eq!(WALL_KICKS, [-1, 1, -2, 2, -3, 3]);
    }
}
