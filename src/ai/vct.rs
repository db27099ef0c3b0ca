use crate::ai::minimax::SearchContext;
use crate::ai::threat::{
    THREAT_BROKEN_FOUR, THREAT_DOUBLE_OPEN_THREE, THREAT_FIVE, ThreatClassifier,
};
use crate::core::board::{Board, DIRECTIONS, Player};
use crate::core::moves::MoveGenerator;
use crate::core::state::GameState;

/// Cap on our moves in a forcing line (roughly twenty ply with replies).
pub const VCT_DEPTH_LIMIT: usize = 10;

/// A forcing line is reported as alternating own moves and forced replies.
pub const MAX_SEQUENCE: usize = 20;

/// Victory-by-continuous-threats search. Every own move must create a four
/// so the reply is forced to the single cell preventing five in a row; the
/// line ends in a compound the opponent cannot cover.
pub struct VctSearcher;

impl VctSearcher {
    /// Forced-win search for `player`. Returns the winning line, our moves
    /// alternating with the forced blocks, or `None` when no forcing
    /// sequence exists within `depth` own moves.
    ///
    /// Every stone placed here is removed again on every return path.
    pub fn find_forced_win(
        ctx: &mut SearchContext,
        state: &mut GameState,
        player: Player,
        depth: usize,
    ) -> Option<Vec<(usize, usize)>> {
        let radius = state.config().clamped_radius();
        let candidates = MoveGenerator::candidates(state.board(), radius);

        // A compound double threat needs no continuation at all.
        for &(row, col) in &candidates {
            if ctx.deadline_passed() {
                ctx.timed_out = true;
                return None;
            }
            if ThreatClassifier::evaluate(state.board(), row, col, player)
                >= THREAT_DOUBLE_OPEN_THREE
            {
                return Some(vec![(row, col)]);
            }
        }

        if depth == 0 {
            return None;
        }

        for &(row, col) in &candidates {
            if ctx.deadline_passed() {
                ctx.timed_out = true;
                return None;
            }
            // Only moves that make a four force the reply.
            if ThreatClassifier::evaluate(state.board(), row, col, player) < THREAT_BROKEN_FOUR {
                continue;
            }
            ctx.nodes += 1;

            state.board_mut().place(row, col, player);

            // The four may open a compound follow-up on its own.
            if Self::compound_cell_exists(state.board(), player, radius) {
                state.board_mut().clear(row, col);
                return Some(vec![(row, col)]);
            }

            let blocks = Self::five_completions(state.board(), row, col, player);
            match blocks.len() {
                // Not actually a four: no cell completes five.
                0 => {
                    state.board_mut().clear(row, col);
                    continue;
                }
                1 => {}
                // Two or more completion cells: an open four, unstoppable.
                _ => {
                    state.board_mut().clear(row, col);
                    return Some(vec![(row, col)]);
                }
            }
            let (block_row, block_col) = blocks[0];

            // The forced block must not hand the opponent a four of their
            // own, otherwise the sequence has a counter-threat.
            let counter =
                ThreatClassifier::evaluate(state.board(), block_row, block_col, player.other());
            if counter >= THREAT_BROKEN_FOUR {
                state.board_mut().clear(row, col);
                continue;
            }

            state.board_mut().place(block_row, block_col, player.other());
            let continuation = Self::find_forced_win(ctx, state, player, depth - 1);
            state.board_mut().clear(block_row, block_col);
            state.board_mut().clear(row, col);

            if let Some(mut tail) = continuation {
                let mut sequence = vec![(row, col), (block_row, block_col)];
                sequence.append(&mut tail);
                sequence.truncate(MAX_SEQUENCE);
                return Some(sequence);
            }
        }

        None
    }

    /// Defence against the opponent's forced win. `None` means the opponent
    /// has no forcing line and nothing needs blocking. Otherwise returns a
    /// move that breaks the line, preferring the disruptor with the highest
    /// own threat, or failing that the block of the line's first move.
    pub fn find_forced_win_block(
        ctx: &mut SearchContext,
        state: &mut GameState,
        player: Player,
        depth: usize,
    ) -> Option<(usize, usize)> {
        let opponent = player.other();
        let attack = Self::find_forced_win(ctx, state, opponent, depth)?;

        let radius = state.config().clamped_radius();
        let candidates = MoveGenerator::candidates(state.board(), radius);
        let mut best: Option<((usize, usize), i32)> = None;
        for &(row, col) in &candidates {
            if ctx.deadline_passed() {
                ctx.timed_out = true;
                break;
            }
            state.board_mut().place(row, col, player);
            let still_wins = Self::find_forced_win(ctx, state, opponent, depth).is_some();
            state.board_mut().clear(row, col);
            if still_wins {
                continue;
            }
            let own = ThreatClassifier::evaluate(state.board(), row, col, player);
            if best.is_none_or(|(_, score)| own > score) {
                best = Some(((row, col), own));
            }
        }

        match best {
            Some((mv, _)) => Some(mv),
            None => attack.first().copied(),
        }
    }

    // Any empty cell from which `player` would hold a compound threat.
    // Cells completing five are excluded: those are the block cells the
    // caller resolves separately. A compound cell sits within two of an
    // existing stone, so a widened candidate sweep covers them all.
    fn compound_cell_exists(board: &Board, player: Player, radius: usize) -> bool {
        MoveGenerator::candidates(board, radius.max(2))
            .into_iter()
            .any(|(row, col)| {
                let threat = ThreatClassifier::evaluate(board, row, col, player);
                (THREAT_DOUBLE_OPEN_THREE..THREAT_FIVE).contains(&threat)
            })
    }

    // Empty cells reachable within five steps of the placed stone at which
    // `player` would complete five in a row. Exactly one such cell means
    // the reply is forced there; two or more mean the four cannot be
    // stopped at all.
    fn five_completions(
        board: &Board,
        row: usize,
        col: usize,
        player: Player,
    ) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for &(dr, dc) in &DIRECTIONS {
            for side in [1, -1] {
                for step in 1..=5 {
                    let r = row as i32 + dr * side * step;
                    let c = col as i32 + dc * side * step;
                    if !board.in_bounds(r, c) {
                        break;
                    }
                    match board.get(r as usize, c as usize) {
                        Some(stone) if stone == player => continue,
                        Some(_) => break,
                        None => {
                            let cell = (r as usize, c as usize);
                            if !cells.contains(&cell)
                                && ThreatClassifier::evaluate(board, cell.0, cell.1, player)
                                    >= THREAT_FIVE
                            {
                                cells.push(cell);
                            }
                            break;
                        }
                    }
                }
            }
        }
        cells
    }
}
