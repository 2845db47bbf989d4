//! Property and scenario tests for the engine's public surface.

use connect_four_engine::invariants::{EngineInvariants, InvariantSet};
use connect_four_engine::{
    COLS, ComputerOpponent, GameEngine, GameStatus, Marker, PlaceError, ROWS, rules,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Alternating X/O sequence that fills the board without a run.
const DRAW_SEQUENCE: [usize; ROWS * COLS] = [
    1, 3, 1, 1, 1, 1, 1, 3, 5, 2, 3, 0, 4, 3, 2, 5, 5, 2, 6, 0, 6, 4, 0, 0, 0, 4, 2, 6, 3, 0, 5,
    4, 2, 2, 4, 4, 6, 5, 5, 6, 6, 3,
];

/// Alternating X/O sequence where X completes a rising diagonal on the last move.
const DIAGONAL_WIN: [usize; 11] = [0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3];

fn gravity_holds(engine: &GameEngine) -> bool {
    let board = engine.board();
    (0..COLS).all(|col| {
        let stack = (0..ROWS)
            .rev()
            .take_while(|&row| !board.is_empty(row, col))
            .count();
        let occupied = (0..ROWS).filter(|&row| !board.is_empty(row, col)).count();
        occupied == stack
    })
}

#[test]
fn test_gravity_holds_for_random_legal_sequences() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..50 {
        let mut engine = GameEngine::new();
        let mut marker = Marker::X;

        while !engine.status().is_terminal() {
            let col = rng.gen_range(0..COLS);
            match engine.place(col, marker) {
                Ok(placement) => {
                    assert_eq!(placement.column, col);
                    marker = marker.opponent();
                }
                Err(PlaceError::ColumnFull(full)) => assert_eq!(full, col),
                Err(other) => panic!("unexpected error: {other}"),
            }
            assert!(gravity_holds(&engine));
            assert!(EngineInvariants::check_all(&engine).is_ok());
        }
    }
}

#[test]
fn test_full_board_without_run_is_draw() {
    let mut engine = GameEngine::new();
    let mut marker = Marker::X;

    for (i, &col) in DRAW_SEQUENCE.iter().enumerate() {
        let placement = engine.place(col, marker).unwrap();
        if i + 1 < DRAW_SEQUENCE.len() {
            assert_eq!(placement.status, GameStatus::InProgress, "move {i}");
        } else {
            assert_eq!(placement.status, GameStatus::Draw);
        }
        marker = marker.opponent();
    }

    assert!(engine.is_full());
    assert!(rules::is_draw(engine.board()));
    assert!(!engine.has_connection(Marker::X));
    assert!(!engine.has_connection(Marker::O));
    assert_eq!(engine.place(0, marker), Err(PlaceError::GameOver));
}

#[test]
fn test_diagonal_connection_only_for_mover() {
    let mut engine = GameEngine::new();
    let mut marker = Marker::X;

    for &col in &DIAGONAL_WIN {
        engine.place(col, marker).unwrap();
        marker = marker.opponent();
    }

    assert_eq!(engine.status(), GameStatus::Won(Marker::X));
    assert!(engine.has_connection(Marker::X));
    assert!(!engine.has_connection(Marker::O));
    assert_eq!(rules::winner(engine.board()), Some(Marker::X));
}

#[test]
fn test_reset_after_terminal_matches_fresh_engine() {
    let mut engine = GameEngine::new();
    let mut marker = Marker::X;
    for &col in &DIAGONAL_WIN {
        engine.place(col, marker).unwrap();
        marker = marker.opponent();
    }
    assert!(engine.status().is_terminal());

    engine.reset();

    assert_eq!(engine, GameEngine::new());
    assert_eq!(engine.board().occupied(), 0);
    assert!(engine.history().is_empty());
}

#[test]
fn test_column_fills_bottom_to_top_then_rejects() {
    let mut engine = GameEngine::new();
    let order = [Marker::X, Marker::O, Marker::O, Marker::X, Marker::X, Marker::O];

    for (i, &marker) in order.iter().enumerate() {
        let placement = engine.place_label(5, marker).unwrap();
        assert_eq!(placement.row, ROWS - 1 - i);
    }

    let snapshot = *engine.board();
    assert_eq!(
        engine.place_label(5, Marker::X),
        Err(PlaceError::ColumnFull(4))
    );
    assert_eq!(*engine.board(), snapshot);

    for (i, &marker) in order.iter().enumerate() {
        assert_eq!(engine.board().marker_at(ROWS - 1 - i, 4), Some(marker));
    }
}

#[test]
fn test_computer_games_always_terminate_legally() {
    let mut rng = StdRng::seed_from_u64(5);
    let players = [ComputerOpponent::new(Marker::X), ComputerOpponent::new(Marker::O)];

    for _ in 0..20 {
        let mut engine = GameEngine::new();
        let mut turn = 0;
        while !engine.status().is_terminal() {
            let placement = players[turn % 2].play(&mut engine, &mut rng).unwrap();
            assert_eq!(placement.marker, players[turn % 2].marker());
            turn += 1;
        }
        assert!(turn <= ROWS * COLS);
        assert!(EngineInvariants::check_all(&engine).is_ok());
        match engine.status() {
            GameStatus::Won(marker) => assert!(engine.has_connection(marker)),
            GameStatus::Draw => assert!(engine.is_full()),
            GameStatus::InProgress => unreachable!(),
        }
    }
}
