use std::time::Duration;

use gomoku_engine::core::board::Player;
use gomoku_engine::core::state::{GameConfig, GameState, GameStatus, PlayerKind};
use gomoku_engine::error::EngineError;

fn new_state() -> GameState {
    GameState::new(GameConfig::new(15)).unwrap()
}

#[test]
fn fresh_state_defaults() {
    let state = new_state();
    assert_eq!(state.board().size(), 15);
    assert_eq!(state.current_player(), Player::Crosses);
    assert_eq!(state.status(), GameStatus::Running);
    assert!(state.history().is_empty());
    assert_eq!(state.hash(), 0);
    assert_eq!(state.config().naughts.kind, PlayerKind::Ai);
}

#[test]
fn unsupported_board_size_is_rejected() {
    assert_eq!(
        GameState::new(GameConfig::new(9)).unwrap_err(),
        EngineError::InvalidBoardSize(9)
    );
}

#[test]
fn make_move_flips_player_and_appends_history() {
    let mut state = new_state();
    state
        .make_move(7, 7, Player::Crosses, Duration::from_millis(120), 0, 0, 0)
        .unwrap();
    assert_eq!(state.board().get(7, 7), Some(Player::Crosses));
    assert_eq!(state.current_player(), Player::Naughts);
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.time_for(Player::Crosses), Duration::from_millis(120));
    assert_ne!(state.hash(), 0);
}

#[test]
fn make_move_rejects_occupied_and_out_of_bounds() {
    let mut state = new_state();
    state
        .make_move(7, 7, Player::Crosses, Duration::ZERO, 0, 0, 0)
        .unwrap();
    let before = state.clone();

    assert_eq!(
        state.make_move(7, 7, Player::Naughts, Duration::ZERO, 0, 0, 0),
        Err(EngineError::CellOccupied { row: 7, col: 7 })
    );
    assert_eq!(
        state.make_move(15, 0, Player::Naughts, Duration::ZERO, 0, 0, 0),
        Err(EngineError::OutOfBounds { row: 15, col: 0 })
    );

    // Rejections leave the session untouched.
    assert_eq!(state.hash(), before.hash());
    assert_eq!(state.history().len(), before.history().len());
    assert_eq!(state.current_player(), before.current_player());
}

#[test]
fn winning_move_promotes_status_and_keeps_player() {
    let mut state = new_state();
    for i in 0..4 {
        state
            .make_move(7, 5 + i, Player::Crosses, Duration::ZERO, 0, 0, 0)
            .unwrap();
        state
            .make_move(9, 5 + i, Player::Naughts, Duration::ZERO, 0, 0, 0)
            .unwrap();
    }
    state
        .make_move(7, 9, Player::Crosses, Duration::ZERO, 0, 0, 0)
        .unwrap();
    assert_eq!(state.status(), GameStatus::CrossesWon);
    assert!(state.last_move().unwrap().winning_move);
    // The turn does not pass once the game is over.
    assert_eq!(state.current_player(), Player::Crosses);
}

#[test]
fn undo_pair_restores_everything() {
    let mut state = new_state();
    state
        .make_move(7, 7, Player::Crosses, Duration::from_millis(80), 0, 0, 0)
        .unwrap();
    state
        .make_move(7, 8, Player::Naughts, Duration::from_millis(950), 420, 1500, 100)
        .unwrap();
    let snapshot = state.clone();

    state
        .make_move(8, 8, Player::Crosses, Duration::from_millis(60), 0, 0, 0)
        .unwrap();
    state
        .make_move(6, 6, Player::Naughts, Duration::from_millis(700), 99, 500, 0)
        .unwrap();
    state.undo_pair();

    assert_eq!(state.hash(), snapshot.hash());
    assert_eq!(state.board(), snapshot.board());
    assert_eq!(state.board().stones(), 2);
    assert_eq!(state.history().len(), 2);
    assert_eq!(
        state.time_for(Player::Crosses),
        snapshot.time_for(Player::Crosses)
    );
    assert_eq!(
        state.time_for(Player::Naughts),
        snapshot.time_for(Player::Naughts)
    );
    assert_eq!(state.current_player(), Player::Crosses);
    assert_eq!(state.status(), GameStatus::Running);
}

#[test]
fn undo_pair_rolls_back_a_win() {
    let mut state = new_state();
    for i in 0..4 {
        state
            .make_move(7, 5 + i, Player::Crosses, Duration::ZERO, 0, 0, 0)
            .unwrap();
        state
            .make_move(9, 5 + i, Player::Naughts, Duration::ZERO, 0, 0, 0)
            .unwrap();
    }
    state
        .make_move(7, 9, Player::Crosses, Duration::ZERO, 0, 0, 0)
        .unwrap();
    state
        .make_move(9, 9, Player::Naughts, Duration::ZERO, 0, 0, 0)
        .unwrap();
    assert_eq!(state.status(), GameStatus::NaughtsWon);

    state.undo_pair();
    assert_eq!(state.status(), GameStatus::Running);
    assert!(state.board().is_empty_cell(7, 9));
    assert!(state.board().is_empty_cell(9, 9));
}

#[test]
fn undo_with_too_little_history_is_a_no_op() {
    let mut state = new_state();
    state.undo_pair();
    assert!(state.history().is_empty());

    state
        .make_move(7, 7, Player::Crosses, Duration::ZERO, 0, 0, 0)
        .unwrap();
    state.undo_pair();
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.board().get(7, 7), Some(Player::Crosses));
}

#[test]
fn running_hash_matches_scratch_recomputation() {
    let mut state = new_state();
    let moves = [(7, 7), (7, 8), (8, 7), (6, 6), (9, 9), (5, 5)];
    let mut player = Player::Crosses;
    for &(row, col) in &moves {
        state
            .make_move(row, col, player, Duration::ZERO, 0, 0, 0)
            .unwrap();
        assert_eq!(state.hash(), state.zobrist().compute(state.board()));
        player = player.other();
    }
    state.undo_pair();
    assert_eq!(state.hash(), state.zobrist().compute(state.board()));
}

#[test]
fn last_ai_move_tracks_engine_side() {
    let mut state = new_state();
    state
        .make_move(7, 7, Player::Crosses, Duration::ZERO, 0, 0, 0)
        .unwrap();
    assert_eq!(state.last_ai_move(), None);
    state
        .make_move(8, 8, Player::Naughts, Duration::ZERO, 17, 100, 0)
        .unwrap();
    assert_eq!(state.last_ai_move(), Some((8, 8)));
    state.undo_pair();
    assert_eq!(state.last_ai_move(), None);
}
