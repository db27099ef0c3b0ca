use gomoku_engine::ai::minimax::SearchContext;
use gomoku_engine::ai::threat::{THREAT_DOUBLE_OPEN_THREE, ThreatClassifier};
use gomoku_engine::ai::transposition::TT_SIZE;
use gomoku_engine::ai::vct::{VCT_DEPTH_LIMIT, VctSearcher};
use gomoku_engine::core::board::Player;
use gomoku_engine::core::state::{GameConfig, GameState};

fn state_with(crosses: &[(usize, usize)], naughts: &[(usize, usize)]) -> GameState {
    let mut state = GameState::new(GameConfig::new(15)).unwrap();
    for &(row, col) in crosses {
        state.board_mut().place(row, col, Player::Crosses);
    }
    for &(row, col) in naughts {
        state.board_mut().place(row, col, Player::Naughts);
    }
    state
}

fn ctx() -> SearchContext {
    let mut ctx = SearchContext::new(TT_SIZE);
    ctx.begin(None);
    ctx
}

#[test]
fn intersecting_closed_threes_win_at_the_junction() {
    // Completing either three makes a four; the junction makes both.
    let mut state = state_with(
        &[(7, 5), (7, 6), (7, 7), (4, 8), (5, 8), (6, 8)],
        &[(7, 4), (3, 8)],
    );
    let sequence = VctSearcher::find_forced_win(&mut ctx(), &mut state, Player::Crosses, VCT_DEPTH_LIMIT)
        .expect("double four is a forced win");
    assert_eq!(sequence, vec![(7, 8)]);
}

#[test]
fn open_three_wins_by_making_an_open_four() {
    let mut state = state_with(&[(7, 5), (7, 6), (7, 7)], &[(1, 1)]);
    let sequence = VctSearcher::find_forced_win(&mut ctx(), &mut state, Player::Crosses, VCT_DEPTH_LIMIT)
        .expect("an unblocked three forces the win");
    assert_eq!(sequence.len(), 1);
    let (row, col) = sequence[0];
    assert!(
        ThreatClassifier::evaluate(state.board(), row, col, Player::Crosses)
            >= THREAT_DOUBLE_OPEN_THREE
    );
}

#[test]
fn bare_closed_three_has_no_forced_win() {
    let mut state = state_with(&[(7, 5), (7, 6), (7, 7)], &[(7, 4)]);
    let board_before = state.board().clone();
    let result =
        VctSearcher::find_forced_win(&mut ctx(), &mut state, Player::Crosses, VCT_DEPTH_LIMIT);
    assert!(result.is_none());
    // Every speculative stone must have been taken back.
    assert_eq!(state.board(), &board_before);
}

#[test]
fn fizzling_four_chain_unwinds_cleanly() {
    // Several candidate fours exist, none leads anywhere; the search has
    // to recurse a few plies and restore the board on every path.
    let mut state = state_with(
        &[(7, 5), (7, 6), (7, 7), (10, 8), (11, 8)],
        &[(7, 4)],
    );
    let board_before = state.board().clone();
    let mut context = ctx();
    let result =
        VctSearcher::find_forced_win(&mut context, &mut state, Player::Crosses, VCT_DEPTH_LIMIT);
    assert!(result.is_none());
    assert!(context.nodes > 1, "the chain should have been explored");
    assert_eq!(state.board(), &board_before);
}

#[test]
fn defence_finds_a_disrupting_block() {
    // Naughts to move against an open three: only the two extension
    // points kill every forcing line.
    let mut state = state_with(&[(7, 6), (7, 7), (7, 8)], &[(1, 1)]);
    let board_before = state.board().clone();
    let block =
        VctSearcher::find_forced_win_block(&mut ctx(), &mut state, Player::Naughts, VCT_DEPTH_LIMIT)
            .expect("the open three must be answered");
    assert!(
        block == (7, 5) || block == (7, 9),
        "unexpected block at {block:?}"
    );
    assert_eq!(state.board(), &board_before);
}

#[test]
fn defence_reports_nothing_when_no_attack_exists() {
    let mut state = state_with(&[(7, 7)], &[(8, 8)]);
    let block =
        VctSearcher::find_forced_win_block(&mut ctx(), &mut state, Player::Naughts, VCT_DEPTH_LIMIT);
    assert!(block.is_none());
}
