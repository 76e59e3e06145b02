//! Session scenarios driven only through commands

use falling_blocks::core::{GameSession, PieceSequence, StepOutcome};
use falling_blocks::types::{Command, PieceKind};

fn session_of(kinds: &[PieceKind]) -> GameSession<PieceSequence> {
    GameSession::with_source(PieceSequence::new(kinds.to_vec()))
}

fn shift(session: &mut GameSession<PieceSequence>, dx: i32) {
    let cmd = if dx < 0 {
        Command::MoveLeft
    } else {
        Command::MoveRight
    };
    for _ in 0..dx.abs() {
        assert_eq!(session.apply(cmd), StepOutcome::Moved);
    }
}

#[test]
fn test_o_piece_falls_to_floor_in_nineteen_ticks() {
    let mut session = GameSession::with_source(PieceSequence::repeat(PieceKind::O));
    assert_eq!((session.current().x, session.current().y), (3, 0));

    for _ in 0..18 {
        assert_eq!(session.apply(Command::Tick), StepOutcome::Moved);
    }
    let outcome = session.apply(Command::Tick);
    assert!(matches!(outcome, StepOutcome::Locked(ev) if ev.lines_cleared == 0));

    let bottom: Vec<_> = session.board().rows().last().unwrap().to_vec();
    assert_eq!(bottom, vec![0, 0, 0, 4, 4, 0, 0, 0, 0, 0]);
    assert_eq!(session.score(), 0);
    assert_eq!(session.pieces_locked(), 1);
}

#[test]
fn test_five_o_pieces_clear_two_rows() {
    let mut session = session_of(&[PieceKind::O]);

    // O spawns over columns 3-4; land one pair of columns per piece
    for (i, dx) in [-3, -1, 1, 3, 5].into_iter().enumerate() {
        shift(&mut session, dx);
        let outcome = session.apply(Command::HardDrop);
        let StepOutcome::Locked(ev) = outcome else {
            panic!("expected a lock, got {outcome:?}");
        };
        if i < 4 {
            assert_eq!(ev.lines_cleared, 0);
        } else {
            assert_eq!(ev.lines_cleared, 2);
            assert_eq!(ev.score_awarded, 300);
        }
    }

    assert_eq!(session.score(), 300);
    assert_eq!(session.lines_cleared(), 2);
    assert_eq!(session.board().filled_cells(), 0);
}

#[test]
fn test_hard_drop_lands_on_shadow_row() {
    for kind in PieceKind::ALL {
        let mut session = session_of(&[kind]);
        session.apply(Command::Rotate);
        session.apply(Command::MoveRight);

        let landing = session.drop_row();
        let expected = session.current().translated(0, landing - session.current().y);
        assert_eq!(session.snapshot().shadow_y, landing);

        session.apply(Command::HardDrop);
        for (x, y, cell) in expected.cells() {
            assert_eq!(session.board().get(x, y), Some(cell), "{kind:?} at ({x}, {y})");
        }
    }
}

#[test]
fn test_second_hold_before_lock_is_ignored() {
    let mut session = session_of(&[PieceKind::I, PieceKind::T, PieceKind::S]);

    assert!(matches!(
        session.apply(Command::Hold),
        StepOutcome::Held { game_over: false }
    ));
    let before = session.snapshot();
    assert_eq!(session.apply(Command::Hold), StepOutcome::Ignored);
    assert_eq!(session.snapshot(), before);

    session.apply(Command::HardDrop);
    assert!(session.can_hold());
    assert!(session.apply(Command::Hold).changed());
}

#[test]
fn test_stack_overflow_ends_game_until_restart() {
    let mut session = session_of(&[PieceKind::O]);

    let mut drops = 0;
    while !session.is_over() {
        session.apply(Command::HardDrop);
        drops += 1;
        assert!(drops <= 10, "game should end once the column fills");
    }

    assert_eq!(session.apply(Command::MoveLeft), StepOutcome::Ignored);
    assert_eq!(session.apply(Command::Tick), StepOutcome::Ignored);
    assert_eq!(session.apply(Command::Restart), StepOutcome::Restarted);
    assert!(!session.is_over());
    assert_eq!(session.board().filled_cells(), 0);
    assert_eq!(session.score(), 0);
}

#[test]
fn test_seeded_sessions_are_deterministic() {
    let mut a = GameSession::new(99);
    let mut b = GameSession::new(99);

    for cmd in [
        Command::MoveLeft,
        Command::Rotate,
        Command::HardDrop,
        Command::Hold,
        Command::HardDrop,
        Command::Tick,
    ] {
        assert_eq!(a.apply(cmd), b.apply(cmd));
    }
    assert_eq!(a.snapshot(), b.snapshot());
}
