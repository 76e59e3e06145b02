//! Game session module - the command-driven state machine
//!
//! The session owns the board, the falling piece, a one-piece lookahead, the
//! hold slot and the score. A driver feeds it one [`Command`] at a time;
//! every command returns a [`StepOutcome`] describing what happened.
//!
//! States are `Falling` and `GameOver`. Locking is not a state, it is the
//! branch taken whenever a downward move fails: lock, clear lines, score,
//! promote the lookahead and check the new piece's spawn position.

use crate::board::Board;
use crate::piece::Piece;
use crate::rng::{PieceSource, UniformPieces};
use crate::scoring::line_clear_score;
use crate::snapshot::SessionSnapshot;
use crate::types::{Command, WALL_KICKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Normal play
    Falling,
    /// Terminal until a restart
    GameOver,
}

/// Result of a lock (the piece could not move down any further)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub score_awarded: u32,
    /// The piece spawned after this lock had no legal position
    pub game_over: bool,
}

/// What a single command did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not applicable in the current state, or the move was blocked
    Ignored,
    /// The falling piece moved or rotated
    Moved,
    /// The hold slot changed
    Held { game_over: bool },
    /// The falling piece locked into the board
    Locked(LockEvent),
    /// A fresh game started
    Restarted,
}

impl StepOutcome {
    /// Whether anything visible changed
    pub fn changed(&self) -> bool {
        !matches!(self, StepOutcome::Ignored)
    }
}

/// Complete single-player game state
#[derive(Debug, Clone)]
pub struct GameSession<S = UniformPieces> {
    board: Board,
    current: Piece,
    next: Piece,
    held: Option<Piece>,
    can_hold: bool,
    score: u32,
    state: SessionState,
    lines_cleared: u32,
    pieces_locked: u32,
    source: S,
}

impl GameSession<UniformPieces> {
    /// Create a new game with uniformly drawn pieces from the given seed
    pub fn new(seed: u32) -> Self {
        Self::with_source(UniformPieces::new(seed))
    }
}

impl Default for GameSession<UniformPieces> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<S: PieceSource> GameSession<S> {
    /// Create a new game drawing pieces from `source`
    pub fn with_source(mut source: S) -> Self {
        let current = Piece::new(source.next_kind());
        let next = Piece::new(source.next_kind());
        Self {
            board: Board::new(),
            current,
            next,
            held: None,
            can_hold: true,
            score: 0,
            state: SessionState::Falling,
            lines_cleared: 0,
            pieces_locked: 0,
            source,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn held(&self) -> Option<&Piece> {
        self.held.as_ref()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    /// Total rows cleared since the last restart
    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Total pieces locked since the last restart
    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    /// Row the current piece would land on (shadow projection)
    pub fn drop_row(&self) -> i32 {
        self.board.compute_drop_row(&self.current)
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn current_mut(&mut self) -> &mut Piece {
        &mut self.current
    }

    /// Renderer view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    /// Apply a game command
    pub fn apply(&mut self, command: Command) -> StepOutcome {
        match command {
            Command::Restart => {
                self.restart();
                StepOutcome::Restarted
            }
            _ if self.is_over() => StepOutcome::Ignored,
            Command::MoveLeft => self.shift(-1),
            Command::MoveRight => self.shift(1),
            Command::SoftDown | Command::Tick => self.step_down(),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.hard_drop(),
            Command::Hold => self.hold(),
        }
    }

    /// Translate sideways, undoing the move if it collides
    fn shift(&mut self, dx: i32) -> StepOutcome {
        self.current.translate(dx, 0);
        if self.board.is_valid_position(&self.current) {
            StepOutcome::Moved
        } else {
            self.current.translate(-dx, 0);
            StepOutcome::Ignored
        }
    }

    /// Try to move down one row; leaves the piece in place on failure
    fn move_down(&mut self) -> bool {
        self.current.translate(0, 1);
        if self.board.is_valid_position(&self.current) {
            true
        } else {
            self.current.translate(0, -1);
            false
        }
    }

    fn step_down(&mut self) -> StepOutcome {
        if self.move_down() {
            StepOutcome::Moved
        } else {
            StepOutcome::Locked(self.lock_and_spawn())
        }
    }

    fn hard_drop(&mut self) -> StepOutcome {
        while self.move_down() {}
        StepOutcome::Locked(self.lock_and_spawn())
    }

    /// Rotate clockwise, trying column kicks before giving up
    fn rotate(&mut self) -> StepOutcome {
        let before = self.current;
        self.current.rotate_clockwise();
        if self.board.is_valid_position(&self.current) {
            return StepOutcome::Moved;
        }

        let rotated = self.current;
        for dx in WALL_KICKS {
            let kicked = rotated.translated(dx, 0);
            if self.board.is_valid_position(&kicked) {
                self.current = kicked;
                return StepOutcome::Moved;
            }
        }

        // Restore the saved piece rather than counter-rotating.
        self.current = before;
        StepOutcome::Ignored
    }

    /// Swap the falling piece into the hold slot, at most once per lock
    fn hold(&mut self) -> StepOutcome {
        if !self.can_hold {
            return StepOutcome::Ignored;
        }

        match self.held.take() {
            None => {
                self.held = Some(self.current);
                self.spawn_next();
            }
            Some(mut previous) => {
                previous.reset_origin();
                self.held = Some(self.current);
                self.current = previous;
            }
        }
        self.can_hold = false;

        let game_over = self.check_spawn();
        StepOutcome::Held { game_over }
    }

    /// Commit the current piece, clear lines, score and bring in the next piece
    fn lock_and_spawn(&mut self) -> LockEvent {
        self.board.lock(&self.current);
        self.pieces_locked += 1;
        self.can_hold = true;

        let lines = self.board.clear_lines();
        let awarded = line_clear_score(lines);
        self.lines_cleared += lines;
        self.score += awarded;

        self.spawn_next();
        let game_over = self.check_spawn();

        LockEvent {
            lines_cleared: lines,
            score_awarded: awarded,
            game_over,
        }
    }

    /// Promote the lookahead and draw a new one
    fn spawn_next(&mut self) {
        let fresh = Piece::new(self.source.next_kind());
        self.current = std::mem::replace(&mut self.next, fresh);
    }

    /// Enter `GameOver` if the current piece has no legal position
    fn check_spawn(&mut self) -> bool {
        if !self.board.is_valid_position(&self.current) {
            self.state = SessionState::GameOver;
        }
        self.is_over()
    }

    /// Reset everything except the piece source
    pub fn restart(&mut self) {
        self.board.clear();
        self.score = 0;
        self.lines_cleared = 0;
        self.pieces_locked = 0;
        self.held = None;
        self.can_hold = true;
        self.state = SessionState::Falling;
        self.current = Piece::new(self.source.next_kind());
        self.next = Piece::new(self.source.next_kind());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PieceSequence;
    use crate::types::{PieceKind, BOARD_WIDTH};

    fn session_of(kinds: &[PieceKind]) -> GameSession<PieceSequence> {
        GameSession::with_source(PieceSequence::new(kinds.to_vec()))
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new(12345);

        assert_eq!(session.state(), SessionState::Falling);
        assert_eq!(session.score(), 0);
        assert!(session.can_hold());
        assert!(session.held().is_none());
        assert_eq!((session.current().x, session.current().y), (3, 0));
        assert_eq!(session.board().filled_cells(), 0);
    }

    #[test]
    fn test_lookahead_is_promoted() {
        let mut session = session_of(&[PieceKind::I, PieceKind::T, PieceKind::Z]);
        assert_eq!(session.current().kind, PieceKind::I);
        assert_eq!(session.next().kind, PieceKind::T);

        session.apply(Command::HardDrop);
        assert_eq!(session.current().kind, PieceKind::T);
        assert_eq!(session.next().kind, PieceKind::Z);
    }

    #[test]
    fn test_move_reverts_at_wall() {
        let mut session = session_of(&[PieceKind::O]);
        for _ in 0..3 {
            assert_eq!(session.apply(Command::MoveLeft), StepOutcome::Moved);
        }
        assert_eq!(session.current().x, 0);
        assert_eq!(session.apply(Command::MoveLeft), StepOutcome::Ignored);
        assert_eq!(session.current().x, 0);
    }

    #[test]
    fn test_rotate_kicks_off_right_wall() {
        let mut session = session_of(&[PieceKind::I]);
        // Vertical I against the right wall
        session.apply(Command::Rotate);
        for _ in 0..10 {
            session.apply(Command::MoveRight);
        }
        assert_eq!(session.current().x, BOARD_WIDTH as i32 - 1);

        // Horizontal again: needs a kick of -3 columns
        assert_eq!(session.apply(Command::Rotate), StepOutcome::Moved);
        assert_eq!(session.current().shape.width(), 4);
        assert_eq!(session.current().x, BOARD_WIDTH as i32 - 4);
    }

    #[test]
    fn test_rotate_prefers_left_kick() {
        let mut session = session_of(&[PieceKind::T]);
        session.current_mut().x = 4;
        session.current_mut().y = 10;
        // Blocks the rotated T's lower stem only
        session.board_mut().set(4, 12, 1);

        let mut rotated = *session.current();
        rotated.rotate_clockwise();
        assert!(!session.board().is_valid_position(&rotated));
        assert!(session.board().is_valid_position(&rotated.translated(-1, 0)));
        assert!(session.board().is_valid_position(&rotated.translated(1, 0)));

        assert_eq!(session.apply(Command::Rotate), StepOutcome::Moved);
        assert_eq!(session.current().shape, rotated.shape);
        assert_eq!((session.current().x, session.current().y), (3, 10));
    }

    #[test]
    fn test_rotate_reverts_when_no_kick_fits() {
        let mut session = session_of(&[PieceKind::I]);
        session.apply(Command::Rotate);
        // Drop the vertical I into a one-wide well
        for y in 10..20 {
            for x in 0..BOARD_WIDTH as i32 {
                if x != 3 {
                    session.board_mut().set(x, y, 1);
                }
            }
        }
        for _ in 0..10 {
            session.apply(Command::Tick);
        }
        let before = *session.current();
        assert_eq!(session.apply(Command::Rotate), StepOutcome::Ignored);
        assert_eq!(*session.current(), before);
    }

    #[test]
    fn test_tick_locks_and_clears() {
        let mut session = session_of(&[PieceKind::I]);
        for x in 0..BOARD_WIDTH as i32 {
            if !(3..7).contains(&x) {
                session.board_mut().set(x, 19, 2);
            }
        }

        let mut locked = None;
        for _ in 0..20 {
            if let StepOutcome::Locked(event) = session.apply(Command::Tick) {
                locked = Some(event);
                break;
            }
        }

        let event = locked.expect("piece should lock");
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(event.score_awarded, 100);
        assert!(!event.game_over);
        assert_eq!(session.score(), 100);
        assert_eq!(session.board().filled_cells(), 0);
    }

    #[test]
    fn test_hold_empty_slot_consumes_lookahead() {
        let mut session = session_of(&[PieceKind::T, PieceKind::S, PieceKind::Z]);
        assert_eq!(
            session.apply(Command::Hold),
            StepOutcome::Held { game_over: false }
        );
        assert_eq!(session.held().map(|p| p.kind), Some(PieceKind::T));
        assert_eq!(session.current().kind, PieceKind::S);
        assert_eq!(session.next().kind, PieceKind::Z);
        assert!(!session.can_hold());
    }

    #[test]
    fn test_hold_swap_resets_origin() {
        let mut session = session_of(&[PieceKind::T, PieceKind::S, PieceKind::Z]);
        session.apply(Command::Hold);
        session.apply(Command::HardDrop);
        assert!(session.can_hold());

        session.apply(Command::MoveLeft);
        session.apply(Command::Tick);
        session.apply(Command::Hold);
        let current = session.current();
        assert_eq!(current.kind, PieceKind::T);
        assert_eq!((current.x, current.y), (3, 0));
        assert_eq!(session.held().map(|p| p.kind), Some(PieceKind::Z));
    }

    #[test]
    fn test_game_over_blocks_commands() {
        let mut session = session_of(&[PieceKind::O]);
        let mut over = false;
        for _ in 0..20 {
            if let StepOutcome::Locked(event) = session.apply(Command::HardDrop) {
                if event.game_over {
                    over = true;
                    break;
                }
            }
        }
        assert!(over);
        assert!(session.is_over());

        let board = session.board().clone();
        for cmd in [
            Command::MoveLeft,
            Command::MoveRight,
            Command::SoftDown,
            Command::Rotate,
            Command::HardDrop,
            Command::Hold,
            Command::Tick,
        ] {
            assert_eq!(session.apply(cmd), StepOutcome::Ignored);
        }
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut session = session_of(&[PieceKind::I]);
        session.current_mut().x = 0;
        session.apply(Command::Hold);
        session.apply(Command::HardDrop);
        assert!(session.board().filled_cells() > 0);

        assert_eq!(session.apply(Command::Restart), StepOutcome::Restarted);
        assert_eq!(session.state(), SessionState::Falling);
        assert_eq!(session.score(), 0);
        assert!(session.held().is_none());
        assert!(session.can_hold());
        assert_eq!(session.board().filled_cells(), 0);
        assert_eq!(session.pieces_locked(), 0);
    }
}
