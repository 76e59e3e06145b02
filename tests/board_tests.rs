//! Board and shape tests through the public facade

use falling_blocks::core::{Board, Piece, Shape};
use falling_blocks::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

fn fill_row(board: &mut Board, y: i32) {
    for x in 0..BOARD_WIDTH as i32 {
        board.set(x, y, 1);
    }
}

#[test]
fn test_board_new_empty() {
    let board = Board::new();
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);

    for y in 0..BOARD_HEIGHT as i32 {
        for x in 0..BOARD_WIDTH as i32 {
            assert_eq!(board.get(x, y), Some(0), "cell ({x}, {y}) should be empty");
        }
    }
}

#[test]
fn test_board_out_of_bounds() {
    let mut board = Board::new();

    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(BOARD_WIDTH as i32, 0), None);
    assert_eq!(board.get(0, BOARD_HEIGHT as i32), None);

    assert!(!board.set(-1, 0, 1));
    assert!(!board.set(0, BOARD_HEIGHT as i32, 1));
    assert_eq!(board.filled_cells(), 0);
}

#[test]
fn test_valid_position_matches_cell_rule() {
    let mut board = Board::new();
    board.set(5, 10, 3);

    // Sweep a T over every origin and compare against the per-cell rule
    let base = Piece::new(PieceKind::T);
    for y in -4..BOARD_HEIGHT as i32 + 2 {
        for x in -4..BOARD_WIDTH as i32 + 2 {
            let piece = Piece { x, y, ..base };
            let expected = piece.cells().all(|(cx, cy, _)| {
                (0..BOARD_WIDTH as i32).contains(&cx)
                    && cy < BOARD_HEIGHT as i32
                    && (cy < 0 || !board.is_occupied(cx, cy))
            });
            assert_eq!(
                board.is_valid_position(&piece),
                expected,
                "origin ({x}, {y})"
            );
        }
    }
}

#[test]
fn test_single_full_row_cleared() {
    let mut board = Board::new();
    fill_row(&mut board, 19);

    assert_eq!(board.clear_lines(), 1);
    assert!(board.rows().last().unwrap().iter().all(|&c| c == 0));
    assert_eq!(board.filled_cells(), 0);
}

#[test]
fn test_two_full_rows_cleared() {
    let mut board = Board::new();
    fill_row(&mut board, 18);
    fill_row(&mut board, 19);
    board.set(2, 17, 6);

    assert_eq!(board.clear_lines(), 2);
    assert_eq!(board.get(2, 19), Some(6));
    assert_eq!(board.filled_cells(), 1);
}

#[test]
fn test_rotation_inverse_for_every_kind() {
    for kind in PieceKind::ALL {
        let shape = Shape::of(kind);
        assert_eq!(shape.rotate_cw().rotate_ccw(), shape, "{kind:?}");
        assert_eq!(shape.rotate_ccw().rotate_cw(), shape, "{kind:?}");

        let mut spun = shape;
        for _ in 0..4 {
            spun = spun.rotate_cw();
        }
        assert_eq!(spun, shape, "{kind:?}");
        assert_eq!(shape.rotate_cw().width(), shape.height());
    }
}

#[test]
fn test_drop_row_on_stack() {
    let mut board = Board::new();
    fill_row(&mut board, 19);
    fill_row(&mut board, 18);

    let piece = Piece::new(PieceKind::I);
    assert_eq!(board.compute_drop_row(&piece), 17);
}
