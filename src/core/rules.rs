use crate::core::board::{Board, DIRECTIONS, Player};

/// Stones in a row needed to win. Overlines count as wins too.
pub const WIN_LENGTH: usize = 5;

pub struct WinChecker;

impl WinChecker {
    /// Full-board scan for a run of five or more.
    pub fn has_winner(board: &Board, player: Player) -> bool {
        for row in 0..board.size() {
            for col in 0..board.size() {
                if board.get(row, col) == Some(player)
                    && Self::run_from(board, row, col, player)
                {
                    return true;
                }
            }
        }
        false
    }

    pub fn winning_player(board: &Board) -> Option<Player> {
        if Self::has_winner(board, Player::Crosses) {
            Some(Player::Crosses)
        } else if Self::has_winner(board, Player::Naughts) {
            Some(Player::Naughts)
        } else {
            None
        }
    }

    /// Win test restricted to lines through one cell, for use after a move.
    pub fn wins_through(board: &Board, row: usize, col: usize) -> bool {
        let Some(player) = board.get(row, col) else {
            return false;
        };
        for &(dr, dc) in &DIRECTIONS {
            let mut count = 1;
            count += Self::count_side(board, row, col, player, dr, dc);
            count += Self::count_side(board, row, col, player, -dr, -dc);
            if count >= WIN_LENGTH {
                return true;
            }
        }
        false
    }

    // Forward-only run check from a starting stone.
    fn run_from(board: &Board, row: usize, col: usize, player: Player) -> bool {
        for &(dr, dc) in &DIRECTIONS {
            if 1 + Self::count_side(board, row, col, player, dr, dc) >= WIN_LENGTH {
                return true;
            }
        }
        false
    }

    fn count_side(board: &Board, row: usize, col: usize, player: Player, dr: i32, dc: i32) -> usize {
        let mut count = 0;
        let mut r = row as i32 + dr;
        let mut c = col as i32 + dc;
        while board.in_bounds(r, c) && board.get(r as usize, c as usize) == Some(player) {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}
