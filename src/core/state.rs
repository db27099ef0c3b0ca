use std::time::Duration;

use crate::core::board::{Board, Player};
use crate::core::moves::{DEFAULT_RADIUS, MAX_RADIUS, MIN_RADIUS};
use crate::core::rules::WinChecker;
use crate::core::zobrist::ZobristKeys;
use crate::error::EngineError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    CrossesWon,
    NaughtsWon,
    Draw,
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SideConfig {
    pub kind: PlayerKind,
    pub depth: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub board_size: usize,
    pub crosses: SideConfig,
    pub naughts: SideConfig,
    pub radius: usize,
    pub timeout: Option<Duration>,
}

impl GameConfig {
    pub fn new(board_size: usize) -> Self {
        Self {
            board_size,
            crosses: SideConfig {
                kind: PlayerKind::Human,
                depth: 3,
            },
            naughts: SideConfig {
                kind: PlayerKind::Ai,
                depth: 3,
            },
            radius: DEFAULT_RADIUS,
            timeout: None,
        }
    }

    pub fn side(&self, player: Player) -> SideConfig {
        match player {
            Player::Crosses => self.crosses,
            Player::Naughts => self.naughts,
        }
    }

    pub fn clamped_radius(&self) -> usize {
        self.radius.clamp(MIN_RADIUS, MAX_RADIUS)
    }
}

/// One committed move. Immutable once recorded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveRecord {
    pub row: usize,
    pub col: usize,
    pub player: Player,
    pub wall_time: Duration,
    pub positions_evaluated: u64,
    pub own_threat_score: i32,
    pub opponent_threat_score: i32,
    pub winning_move: bool,
}

/// Board, history, status and cached derived facts for one game session.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    history: Vec<MoveRecord>,
    current_player: Player,
    status: GameStatus,
    config: GameConfig,
    zobrist: ZobristKeys,
    hash: u64,
    crosses_time: Duration,
    naughts_time: Duration,
    last_ai_move: Option<(usize, usize)>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        let board = Board::new(config.board_size)?;
        let zobrist = ZobristKeys::new(config.board_size);
        Ok(Self {
            board,
            history: Vec::new(),
            current_player: Player::Crosses,
            status: GameStatus::Running,
            config,
            zobrist,
            hash: 0,
            crosses_time: Duration::ZERO,
            naughts_time: Duration::ZERO,
            last_ai_move: None,
        })
    }

    /// Rebuild a session from externally supplied parts, recomputing the
    /// caches the parts do not carry. Used when a wire payload arrives.
    pub fn restore(
        config: GameConfig,
        board: Board,
        history: Vec<MoveRecord>,
        status: GameStatus,
        current_player: Player,
        crosses_time: Duration,
        naughts_time: Duration,
    ) -> Self {
        let zobrist = ZobristKeys::new(board.size());
        let hash = zobrist.compute(&board);
        let last_ai_move = history
            .iter()
            .rev()
            .find(|record| config.side(record.player).kind == PlayerKind::Ai)
            .map(|record| (record.row, record.col));
        Self {
            board,
            history,
            current_player,
            status,
            config,
            zobrist,
            hash,
            crosses_time,
            naughts_time,
            last_ai_move,
        }
    }

    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for the search, which places and removes
    /// stones in strict LIFO pairs and leaves the board as it found it.
    #[inline(always)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[inline(always)]
    pub fn zobrist(&self) -> &ZobristKeys {
        &self.zobrist
    }

    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline(always)]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline(always)]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn set_current_player(&mut self, player: Player) {
        self.current_player = player;
    }

    #[inline(always)]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn last_ai_move(&self) -> Option<(usize, usize)> {
        self.last_ai_move
    }

    pub fn time_for(&self, player: Player) -> Duration {
        match player {
            Player::Crosses => self.crosses_time,
            Player::Naughts => self.naughts_time,
        }
    }

    pub fn quit(&mut self) {
        self.status = GameStatus::Quit;
    }

    /// Commit a move: board write, hash toggle, history append, time
    /// accounting and status promotion. Fails without touching anything
    /// when the cell is out of bounds or occupied.
    #[allow(clippy::too_many_arguments)]
    pub fn make_move(
        &mut self,
        row: usize,
        col: usize,
        player: Player,
        wall_time: Duration,
        positions_evaluated: u64,
        own_threat_score: i32,
        opponent_threat_score: i32,
    ) -> Result<(), EngineError> {
        if row >= self.board.size() || col >= self.board.size() {
            return Err(EngineError::OutOfBounds { row, col });
        }
        if !self.board.is_empty_cell(row, col) {
            return Err(EngineError::CellOccupied { row, col });
        }

        self.board.place(row, col, player);
        self.hash = self.zobrist.toggle(self.hash, row, col, player);
        match player {
            Player::Crosses => self.crosses_time += wall_time,
            Player::Naughts => self.naughts_time += wall_time,
        }

        let won = WinChecker::wins_through(&self.board, row, col);
        self.history.push(MoveRecord {
            row,
            col,
            player,
            wall_time,
            positions_evaluated,
            own_threat_score,
            opponent_threat_score,
            winning_move: won,
        });
        if self.config.side(player).kind == PlayerKind::Ai {
            self.last_ai_move = Some((row, col));
        }

        if won {
            self.status = match player {
                Player::Crosses => GameStatus::CrossesWon,
                Player::Naughts => GameStatus::NaughtsWon,
            };
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
        } else {
            self.current_player = player.other();
        }
        Ok(())
    }

    /// Roll back the last two moves (one full human/AI turn). Restores the
    /// board, the hash and the per-player time accounting bit for bit.
    /// A no-op when fewer than two moves exist.
    pub fn undo_pair(&mut self) {
        if self.history.len() < 2 {
            return;
        }
        for _ in 0..2 {
            let record = self.history.pop().expect("history length checked");
            self.board.clear(record.row, record.col);
            self.hash = self.zobrist.toggle(self.hash, record.row, record.col, record.player);
            match record.player {
                Player::Crosses => self.crosses_time -= record.wall_time,
                Player::Naughts => self.naughts_time -= record.wall_time,
            }
        }
        self.status = GameStatus::Running;
        self.current_player = Player::Crosses;
        self.last_ai_move = None;
    }
}
