use std::time::{Duration, Instant};

use crate::ai::move_ordering::MoveOrdering;
use crate::ai::threat::ThreatClassifier;
use crate::ai::transposition::{BoundFlag, KillerTable, TranspositionTable};
use crate::core::board::Player;
use crate::core::moves::MoveGenerator;
use crate::core::rules::WinChecker;
use crate::core::state::GameState;

/// Terminal value floor. Wins found earlier in the tree score higher than
/// later ones through the `+ depth` term.
pub const WIN_VALUE: i32 = 1_000_000;

/// Window bound safely outside every reachable score.
pub const INFINITY: i32 = i32::MAX - 1;

/// Mutable search state shared by the cascade, minimax and the forcing
/// searches. The table and killer slots deliberately survive between root
/// moves of the same engine.
pub struct SearchContext {
    pub tt: TranspositionTable,
    pub killers: KillerTable,
    pub nodes: u64,
    pub deadline: Option<Instant>,
    pub timed_out: bool,
}

impl SearchContext {
    pub fn new(table_size: usize) -> Self {
        Self {
            tt: TranspositionTable::new(table_size),
            killers: KillerTable::new(),
            nodes: 0,
            deadline: None,
            timed_out: false,
        }
    }

    /// Arm the per-decision bookkeeping. `timeout` of `None` means the
    /// search runs to its configured depth regardless of wall clock.
    pub fn begin(&mut self, timeout: Option<Duration>) {
        self.nodes = 0;
        self.timed_out = false;
        self.deadline = timeout.map(|limit| Instant::now() + limit);
    }

    #[inline]
    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

pub struct Minimax;

impl Minimax {
    /// Depth-limited alpha-beta over the candidate cells. Every placement
    /// is matched by a removal before the frame returns, with the running
    /// hash toggled in step, so the board and hash are unchanged on exit.
    ///
    /// Once `ctx.timed_out` is set the returned value is not meaningful;
    /// callers unwind and keep their last completed result.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        ctx: &mut SearchContext,
        state: &mut GameState,
        hash: u64,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        ai_player: Player,
        last_move: Option<(usize, usize)>,
    ) -> i32 {
        ctx.nodes += 1;

        if ctx.deadline_passed() {
            ctx.timed_out = true;
            return ThreatClassifier::evaluate_board(state.board(), ai_player);
        }

        let entering_alpha = alpha;
        let entering_beta = beta;
        if let Some(entry) = ctx.tt.probe(hash, depth) {
            match entry.flag {
                BoundFlag::Exact => return entry.value,
                BoundFlag::LowerBound => alpha = alpha.max(entry.value),
                BoundFlag::UpperBound => beta = beta.min(entry.value),
            }
            if alpha >= beta {
                return entry.value;
            }
        }

        // Only the player of the previous placement can have just won.
        if let Some((last_row, last_col)) = last_move {
            if WinChecker::wins_through(state.board(), last_row, last_col) {
                let winner = state
                    .board()
                    .get(last_row, last_col)
                    .expect("winning cell holds a stone");
                return if winner == ai_player {
                    WIN_VALUE + depth
                } else {
                    -(WIN_VALUE + depth)
                };
            }
        }

        if depth == 0 {
            let value = ThreatClassifier::evaluate_board(state.board(), ai_player);
            ctx.tt.store(hash, depth, BoundFlag::Exact, value, None);
            return value;
        }

        if state.board().is_full() {
            return 0;
        }

        let to_move = if maximizing { ai_player } else { ai_player.other() };
        let radius = state.config().clamped_radius();
        let mut moves = MoveGenerator::candidates(state.board(), radius);
        MoveOrdering::order(state.board(), &mut moves, to_move, &ctx.killers, depth);

        let mut best = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move = None;
        for &(row, col) in &moves {
            let child_hash = state.zobrist().toggle(hash, row, col, to_move);
            state.board_mut().place(row, col, to_move);
            let value = Self::search(
                ctx,
                state,
                child_hash,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                ai_player,
                Some((row, col)),
            );
            state.board_mut().clear(row, col);

            if ctx.timed_out {
                return best;
            }

            if maximizing {
                if value > best {
                    best = value;
                    best_move = Some((row, col));
                }
                alpha = alpha.max(value);
            } else {
                if value < best {
                    best = value;
                    best_move = Some((row, col));
                }
                beta = beta.min(value);
            }
            if beta <= alpha {
                ctx.killers.record(depth, (row, col));
                break;
            }
        }

        let flag = if best <= entering_alpha {
            BoundFlag::UpperBound
        } else if best >= entering_beta {
            BoundFlag::LowerBound
        } else {
            BoundFlag::Exact
        };
        ctx.tt.store(hash, depth, flag, best, best_move);
        best
    }
}
