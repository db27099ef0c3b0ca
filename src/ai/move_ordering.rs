use crate::ai::threat::{
    THREAT_DOUBLE_OPEN_THREE, THREAT_FIVE, THREAT_OPEN_THREE, ThreatClassifier,
};
use crate::ai::transposition::KillerTable;
use crate::core::board::{Board, Player};

// Priorities only order the search; they never prune anything.
const WIN_NOW: i64 = 2_000_000_000;
const BLOCK_WIN: i64 = 1_500_000_000;
const OWN_COMPOUND: i64 = 1_200_000_000;
const BLOCK_COMPOUND: i64 = 1_100_000_000;
const KILLER_BONUS: i64 = 1_000_000;

pub struct MoveOrdering;

impl MoveOrdering {
    /// Sort candidates so the strongest tactical tries come first for the
    /// side to move at this node.
    pub fn order(
        board: &Board,
        moves: &mut Vec<(usize, usize)>,
        to_move: Player,
        killers: &KillerTable,
        depth: i32,
    ) {
        let mut scored: Vec<(i64, (usize, usize))> = moves
            .iter()
            .map(|&mv| (Self::priority(board, mv, to_move, killers, depth), mv))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        moves.clear();
        moves.extend(scored.into_iter().map(|(_, mv)| mv));
    }

    pub fn priority(
        board: &Board,
        (row, col): (usize, usize),
        to_move: Player,
        killers: &KillerTable,
        depth: i32,
    ) -> i64 {
        let own = ThreatClassifier::evaluate(board, row, col, to_move);
        let opp = ThreatClassifier::evaluate(board, row, col, to_move.other());

        if own >= THREAT_FIVE {
            return WIN_NOW;
        }
        if opp >= THREAT_FIVE {
            return BLOCK_WIN;
        }
        if own >= THREAT_DOUBLE_OPEN_THREE {
            return OWN_COMPOUND + own as i64;
        }
        if opp >= THREAT_DOUBLE_OPEN_THREE {
            return BLOCK_COMPOUND + opp as i64;
        }

        let mut priority = if killers.matches(depth, (row, col)) {
            KILLER_BONUS
        } else {
            0
        };

        // Favour initiative while the opponent holds no serious threat,
        // shift toward defence once an open three is in reach.
        priority += if opp >= THREAT_OPEN_THREE {
            (10 * own + 12 * opp) as i64
        } else {
            (15 * own + 5 * opp) as i64
        };

        let (center_row, center_col) = board.center();
        let distance =
            (row as i64 - center_row as i64).abs() + (col as i64 - center_col as i64).abs();
        priority += (board.size() as i64 - distance).max(0);

        priority
    }
}
