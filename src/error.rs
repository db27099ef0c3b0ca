use thiserror::Error;

/// Caller contract violations. The engine state is left unchanged whenever
/// one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    #[error("unsupported board size {0}, expected 15 or 19")]
    InvalidBoardSize(usize),

    #[error("the game is already over")]
    GameOver,

    #[error("no legal moves are available")]
    NoMoves,

    #[error("malformed replay payload: {0}")]
    MalformedReplay(String),
}
