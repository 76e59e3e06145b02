//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the game rules and state. It has **no** dependencies on
//! rendering, input devices, networking or I/O, which keeps it:
//!
//! - **Deterministic**: the same piece source seed produces the same game
//! - **Testable**: every rule is reachable through plain method calls
//! - **Portable**: any driver (terminal, GUI, headless, test harness) can run it
//!
//! # Module Structure
//!
//! - [`shape`]: immutable shape matrices and their rotations
//! - [`piece`]: the live falling piece (shape + origin)
//! - [`board`]: 10x20 grid with collision detection and line clearing
//! - [`scoring`]: fixed line-clear score table
//! - [`rng`]: seedable piece sources
//! - [`session`]: the command-driven game state machine
//! - [`snapshot`]: renderer view of a session
//!
//! # Game Rules
//!
//! - **Uniform draw**: every new piece is one of the seven kinds at random,
//!   independent of earlier draws
//! - **Lookahead**: exactly one next piece is visible
//! - **Rotation**: clockwise only, with column kicks of -1, +1, -2, +2, -3, +3
//! - **Hold**: one swap per dropped piece
//! - **Scoring**: 100 / 300 / 500 / 800 for 1 / 2 / 3 / 4 lines in one lock
//! - **Game over**: a freshly spawned piece overlaps the stack
//!
//! # Example
//!
//! ```
//! use falling_blocks_core::{GameSession, StepOutcome};
//! use falling_blocks_types::Command;
//!
//! let mut game = GameSession::new(12345);
//!
//! game.apply(Command::MoveRight);
//! game.apply(Command::Rotate);
//! let outcome = game.apply(Command::HardDrop);
//!
//! assert!(matches!(outcome, StepOutcome::Locked(_)));
//! assert_eq!(game.board().filled_cells(), 4);
//! ```

pub mod board;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod shape;
pub mod snapshot;

pub use falling_blocks_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use piece::Piece;
pub use rng::{PieceSequence, PieceSource, SimpleRng, UniformPieces};
pub use scoring::line_clear_score;
pub use session::{GameSession, LockEvent, SessionState, StepOutcome};
pub use shape::Shape;
pub use snapshot::{Grid, PieceView, SessionSnapshot};
