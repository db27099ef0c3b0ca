//! Zobrist hashing.
//!
//! Each (cell, player) pair gets a random 64-bit key; the hash of a position
//! is the XOR of the keys of all occupied cells. XOR-in on place and XOR-out
//! on remove keep the running hash current in O(1).
//!
//! References:
//! - <https://en.wikipedia.org/wiki/Zobrist_hashing>

use crate::core::board::{Board, Player};
use rand::Rng;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

// Fixed key seed so the same position hashes identically across sessions.
const KEY_SEED: u64 = 0x51A3_D60B_77C4_2F18;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZobristKeys {
    position_keys: Vec<[u64; 2]>,
    board_size: usize,
}

impl ZobristKeys {
    pub fn new(board_size: usize) -> Self {
        let total_positions = board_size * board_size;
        let mut rng = ChaCha8Rng::seed_from_u64(KEY_SEED);

        let mut position_keys = Vec::with_capacity(total_positions);
        for _ in 0..total_positions {
            position_keys.push([rng.random::<u64>(), rng.random::<u64>()]);
        }

        Self {
            position_keys,
            board_size,
        }
    }

    #[inline]
    fn position_index(&self, row: usize, col: usize) -> usize {
        row * self.board_size + col
    }

    #[inline]
    fn player_index(player: Player) -> usize {
        match player {
            Player::Crosses => 0,
            Player::Naughts => 1,
        }
    }

    /// The same toggle serves place and remove; XOR is its own inverse.
    #[inline]
    pub fn toggle(&self, hash: u64, row: usize, col: usize, player: Player) -> u64 {
        hash ^ self.position_keys[self.position_index(row, col)][Self::player_index(player)]
    }

    /// Hash of a board computed from scratch. Incremental `toggle` updates
    /// must always agree with this.
    pub fn compute(&self, board: &Board) -> u64 {
        let mut hash = 0;
        for row in 0..self.board_size {
            for col in 0..self.board_size {
                if let Some(player) = board.get(row, col) {
                    hash = self.toggle(hash, row, col, player);
                }
            }
        }
        hash
    }
}
