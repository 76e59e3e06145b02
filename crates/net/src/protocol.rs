//! Protocol module - line-based text messages between hub and clients
//!
//! Every message is one UTF-8 line. Fields are separated by `:`:
//!
//! ```text
//! START
//! PLAYER_JOINED:<id>
//! PLAYER_LEFT:<id>
//! GAME_STATE:<id>:<payload>
//! ```
//!
//! Clients send bare payload lines; the hub wraps them as `GAME_STATE` with
//! the sender's id. A payload is the full board, row-major, every cell
//! followed by a comma (so the line ends in a trailing separator).

use std::fmt::{self, Write as _};

use arrayvec::ArrayVec;

use falling_blocks_core::Board;
use falling_blocks_types::{Cell, BOARD_CELLS};

const START: &str = "START";
const PLAYER_JOINED: &str = "PLAYER_JOINED";
const PLAYER_LEFT: &str = "PLAYER_LEFT";
const GAME_STATE: &str = "GAME_STATE";

/// Highest cell value a payload may carry
const MAX_CELL: u32 = 7;

/// Hub-assigned connection identifier
///
/// Opaque to clients. Lives exactly as long as the connection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Start,
    PlayerJoined(PlayerId),
    PlayerLeft(PlayerId),
    /// `payload` is kept verbatim; decode it with [`decode_board`]
    GameState { player: PlayerId, payload: String },
}

impl Message {
    /// Parse one line (a trailing `\n` / `\r\n` is ignored)
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        if line == START {
            return Ok(Message::Start);
        }

        let mut parts = line.splitn(3, ':');
        let kind = parts.next().unwrap_or_default();
        let player = match parts.next() {
            Some(id) if !id.is_empty() => PlayerId::new(id),
            _ => {
                return match kind {
                    PLAYER_JOINED | PLAYER_LEFT | GAME_STATE => Err(ProtocolError::MissingField {
                        kind: kind.to_string(),
                        field: "id",
                    }),
                    _ => Err(ProtocolError::UnknownKind(kind.to_string())),
                };
            }
        };

        match kind {
            PLAYER_JOINED => Ok(Message::PlayerJoined(player)),
            PLAYER_LEFT => Ok(Message::PlayerLeft(player)),
            GAME_STATE => match parts.next() {
                Some(payload) => Ok(Message::GameState {
                    player,
                    payload: payload.to_string(),
                }),
                None => Err(ProtocolError::MissingField {
                    kind: kind.to_string(),
                    field: "payload",
                }),
            },
            _ => Err(ProtocolError::UnknownKind(kind.to_string())),
        }
    }
}

impl fmt::Display for Message {
    /// Wire form without the line terminator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Start => f.write_str(START),
            Message::PlayerJoined(id) => write!(f, "{PLAYER_JOINED}:{id}"),
            Message::PlayerLeft(id) => write!(f, "{PLAYER_LEFT}:{id}"),
            Message::GameState { player, payload } => write!(f, "{GAME_STATE}:{player}:{payload}"),
        }
    }
}

/// Why a line or payload was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    Empty,
    UnknownKind(String),
    MissingField { kind: String, field: &'static str },
    CellCount { expected: usize, found: usize },
    InvalidCell { index: usize, value: String },
    CellOutOfRange { index: usize, value: u32 },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Empty => f.write_str("empty message"),
            ProtocolError::UnknownKind(kind) => write!(f, "unknown message kind {kind:?}"),
            ProtocolError::MissingField { kind, field } => {
                write!(f, "{kind} message is missing its {field}")
            }
            ProtocolError::CellCount { expected, found } => {
                write!(f, "expected {expected} cells, found {found}")
            }
            ProtocolError::InvalidCell { index, value } => {
                write!(f, "cell {index} is not a number: {value:?}")
            }
            ProtocolError::CellOutOfRange { index, value } => {
                write!(f, "cell {index} value {value} is outside 0..={MAX_CELL}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Serialize a board as a snapshot payload
pub fn encode_board(board: &Board) -> String {
    let mut out = String::with_capacity(BOARD_CELLS * 2);
    for cell in board.cells() {
        let _ = write!(out, "{cell},");
    }
    out
}

/// Parse a snapshot payload back into a board
///
/// One trailing empty field (from the trailing separator) is ignored.
pub fn decode_board(payload: &str) -> Result<Board, ProtocolError> {
    let body = payload.strip_suffix(',').unwrap_or(payload);
    let mut cells: ArrayVec<Cell, BOARD_CELLS> = ArrayVec::new();

    for (index, field) in body.split(',').enumerate() {
        let value: u32 = field.parse().map_err(|_| ProtocolError::InvalidCell {
            index,
            value: field.to_string(),
        })?;
        if value > MAX_CELL {
            return Err(ProtocolError::CellOutOfRange { index, value });
        }
        if cells.try_push(value as Cell).is_err() {
            return Err(ProtocolError::CellCount {
                expected: BOARD_CELLS,
                found: body.split(',').count(),
            });
        }
    }

    let found = cells.len();
    cells
        .into_inner()
        .map(Board::from_flat)
        .map_err(|_| ProtocolError::CellCount {
            expected: BOARD_CELLS,
            found,
        })
}
