//! Replay file and HTTP payload format.
//!
//! One JSON shape serves both: replay files on disk and the stateless HTTP
//! round trip. Boards travel as rows of space-separated cells, moves as a
//! map keyed by `"X (human)"` style labels, so two of the wire types need
//! hand-written serde impls.

use std::fmt;
use std::time::Duration;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ai::report::ScoringReport;
use crate::core::board::{Board, Player};
use crate::core::state::{
    GameConfig, GameState, GameStatus, MoveRecord, PlayerKind, SideConfig,
};
use crate::error::EngineError;

pub const MIN_WIRE_DEPTH: i32 = 1;
pub const MAX_WIRE_DEPTH: i32 = 6;
pub const MIN_WIRE_RADIUS: usize = 1;
pub const MAX_WIRE_RADIUS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideKind {
    #[serde(rename = "human")]
    Human,
    #[serde(rename = "AI")]
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideSpec {
    pub player: SideKind,
    pub depth: i32,
    pub time_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "X")]
    Crosses,
    #[serde(rename = "O")]
    Naughts,
    #[serde(rename = "draw")]
    Draw,
}

/// Wire encoding is the string `"none"` or a whole number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(pub Option<u64>);

impl Serialize for Timeout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            None => serializer.serialize_str("none"),
            Some(seconds) => serializer.serialize_u64(seconds),
        }
    }
}

impl<'de> Deserialize<'de> for Timeout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(u64),
            Tag(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Seconds(seconds) => Ok(Timeout(Some(seconds))),
            Repr::Tag(tag) if tag == "none" => Ok(Timeout(None)),
            Repr::Tag(tag) => Err(de::Error::custom(format!("unknown timeout value {tag:?}"))),
        }
    }
}

/// One move on the wire. The placing side travels as the key of the
/// coordinate pair, e.g. `{"O (AI)": [7, 7], "time_ms": 12.5}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntry {
    pub player: Player,
    pub kind: SideKind,
    pub row: usize,
    pub col: usize,
    pub time_ms: f64,
    pub moves_evaluated: Option<u64>,
    pub score: Option<i32>,
    pub opponent: Option<i32>,
    pub winner: bool,
    pub scoring: Option<ScoringReport>,
}

impl MoveEntry {
    fn label(&self) -> String {
        let side = match self.player {
            Player::Crosses => "X",
            Player::Naughts => "O",
        };
        let kind = match self.kind {
            SideKind::Human => "human",
            SideKind::Ai => "AI",
        };
        format!("{side} ({kind})")
    }
}

fn parse_label(label: &str) -> Option<(Player, SideKind)> {
    match label {
        "X (human)" => Some((Player::Crosses, SideKind::Human)),
        "X (AI)" => Some((Player::Crosses, SideKind::Ai)),
        "O (human)" => Some((Player::Naughts, SideKind::Human)),
        "O (AI)" => Some((Player::Naughts, SideKind::Ai)),
        _ => None,
    }
}

impl Serialize for MoveEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(&self.label(), &[self.row, self.col])?;
        map.serialize_entry("time_ms", &self.time_ms)?;
        if let Some(moves_evaluated) = self.moves_evaluated {
            map.serialize_entry("moves_evaluated", &moves_evaluated)?;
        }
        if let Some(score) = self.score {
            map.serialize_entry("score", &score)?;
        }
        if let Some(opponent) = self.opponent {
            map.serialize_entry("opponent", &opponent)?;
        }
        if self.winner {
            map.serialize_entry("winner", &true)?;
        }
        if let Some(scoring) = &self.scoring {
            map.serialize_entry("scoring", scoring)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MoveEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoveEntryVisitor;

        impl<'de> Visitor<'de> for MoveEntryVisitor {
            type Value = MoveEntry;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a move entry keyed by a player label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<MoveEntry, A::Error> {
                let mut placed: Option<(Player, SideKind, usize, usize)> = None;
                let mut time_ms = None;
                let mut moves_evaluated = None;
                let mut score = None;
                let mut opponent = None;
                let mut winner = false;
                let mut scoring = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "time_ms" => time_ms = Some(map.next_value::<f64>()?),
                        "moves_evaluated" => moves_evaluated = Some(map.next_value::<u64>()?),
                        "score" => score = Some(map.next_value::<i32>()?),
                        "opponent" => opponent = Some(map.next_value::<i32>()?),
                        "winner" => winner = map.next_value::<bool>()?,
                        "scoring" => scoring = Some(map.next_value::<ScoringReport>()?),
                        other => {
                            if let Some((player, kind)) = parse_label(other) {
                                let cell = map.next_value::<[usize; 2]>()?;
                                placed = Some((player, kind, cell[0], cell[1]));
                            } else {
                                map.next_value::<IgnoredAny>()?;
                            }
                        }
                    }
                }

                let (player, kind, row, col) = placed
                    .ok_or_else(|| de::Error::custom("move entry is missing its player label"))?;
                Ok(MoveEntry {
                    player,
                    kind,
                    row,
                    col,
                    time_ms: time_ms.unwrap_or(0.0),
                    moves_evaluated,
                    score,
                    opponent,
                    winner,
                    scoring,
                })
            }
        }

        deserializer.deserialize_map(MoveEntryVisitor)
    }
}

/// The full wire payload: configuration, board snapshot and move history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayGame {
    #[serde(rename = "X")]
    pub crosses: SideSpec,
    #[serde(rename = "O")]
    pub naughts: SideSpec,
    pub board_size: usize,
    pub radius: usize,
    pub timeout: Timeout,
    pub winner: Winner,
    pub board_state: Vec<String>,
    pub moves: Vec<MoveEntry>,
}

impl ReplayGame {
    pub fn from_json(payload: &str) -> Result<Self, EngineError> {
        serde_json::from_str(payload).map_err(|err| EngineError::MalformedReplay(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|err| EngineError::MalformedReplay(err.to_string()))
    }

    /// Snapshot a session. A scoring report, when supplied, rides on the
    /// last move of the history.
    pub fn from_state(state: &GameState, report: Option<&ScoringReport>) -> Self {
        let config = state.config();
        let board = state.board();

        let board_state = (0..board.size())
            .map(|row| {
                (0..board.size())
                    .map(|col| match board.get(row, col) {
                        Some(Player::Crosses) => "X",
                        Some(Player::Naughts) => "O",
                        None => ".",
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let mut moves: Vec<MoveEntry> = state
            .history()
            .iter()
            .map(|record| {
                let engine_side = config.side(record.player).kind == PlayerKind::Ai;
                MoveEntry {
                    player: record.player,
                    kind: kind_to_wire(config.side(record.player).kind),
                    row: record.row,
                    col: record.col,
                    time_ms: record.wall_time.as_secs_f64() * 1000.0,
                    moves_evaluated: engine_side.then_some(record.positions_evaluated),
                    score: engine_side.then_some(record.own_threat_score),
                    opponent: engine_side.then_some(record.opponent_threat_score),
                    winner: record.winning_move,
                    scoring: None,
                }
            })
            .collect();
        if let (Some(last), Some(report)) = (moves.last_mut(), report) {
            last.scoring = Some(report.clone());
        }

        Self {
            crosses: SideSpec {
                player: kind_to_wire(config.crosses.kind),
                depth: config.crosses.depth,
                time_ms: state.time_for(Player::Crosses).as_secs_f64() * 1000.0,
            },
            naughts: SideSpec {
                player: kind_to_wire(config.naughts.kind),
                depth: config.naughts.depth,
                time_ms: state.time_for(Player::Naughts).as_secs_f64() * 1000.0,
            },
            board_size: config.board_size,
            radius: config.radius,
            timeout: Timeout(config.timeout.map(|timeout| timeout.as_secs())),
            winner: match state.status() {
                GameStatus::Running | GameStatus::Quit => Winner::None,
                GameStatus::CrossesWon => Winner::Crosses,
                GameStatus::NaughtsWon => Winner::Naughts,
                GameStatus::Draw => Winner::Draw,
            },
            board_state,
            moves,
        }
    }

    /// The side the engine plays when answering this payload: the opposite
    /// of the last move's player, or Naughts when no move was made yet.
    pub fn engine_role(&self) -> Player {
        match self.moves.last() {
            Some(entry) => entry.player.other(),
            None => Player::Naughts,
        }
    }

    /// Rebuild a session from the payload. Depth and radius are clamped to
    /// the wire ranges; the board grid is authoritative for stones.
    pub fn into_state(self) -> Result<GameState, EngineError> {
        let mut board = Board::new(self.board_size)?;
        if self.board_state.len() != self.board_size {
            return Err(EngineError::MalformedReplay(format!(
                "expected {} board rows, got {}",
                self.board_size,
                self.board_state.len()
            )));
        }
        for (row, line) in self.board_state.iter().enumerate() {
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != self.board_size {
                return Err(EngineError::MalformedReplay(format!(
                    "board row {row} has {} cells, expected {}",
                    cells.len(),
                    self.board_size
                )));
            }
            for (col, token) in cells.iter().enumerate() {
                match *token {
                    "X" => board.place(row, col, Player::Crosses),
                    "O" => board.place(row, col, Player::Naughts),
                    "." => {}
                    other => {
                        return Err(EngineError::MalformedReplay(format!(
                            "unknown cell {other:?} at ({row}, {col})"
                        )));
                    }
                }
            }
        }

        for spec in [&self.crosses, &self.naughts] {
            if !spec.time_ms.is_finite() || spec.time_ms < 0.0 {
                return Err(EngineError::MalformedReplay(format!(
                    "invalid accumulated time {}",
                    spec.time_ms
                )));
            }
        }

        let config = GameConfig {
            board_size: self.board_size,
            crosses: SideConfig {
                kind: wire_to_kind(self.crosses.player),
                depth: self.crosses.depth.clamp(MIN_WIRE_DEPTH, MAX_WIRE_DEPTH),
            },
            naughts: SideConfig {
                kind: wire_to_kind(self.naughts.player),
                depth: self.naughts.depth.clamp(MIN_WIRE_DEPTH, MAX_WIRE_DEPTH),
            },
            radius: self.radius.clamp(MIN_WIRE_RADIUS, MAX_WIRE_RADIUS),
            timeout: self.timeout.0.map(Duration::from_secs),
        };

        let history: Vec<MoveRecord> = self
            .moves
            .iter()
            .map(|entry| {
                if entry.row >= self.board_size || entry.col >= self.board_size {
                    return Err(EngineError::OutOfBounds {
                        row: entry.row,
                        col: entry.col,
                    });
                }
                if !entry.time_ms.is_finite() || entry.time_ms < 0.0 {
                    return Err(EngineError::MalformedReplay(format!(
                        "invalid move time {}",
                        entry.time_ms
                    )));
                }
                Ok(MoveRecord {
                    row: entry.row,
                    col: entry.col,
                    player: entry.player,
                    wall_time: Duration::from_secs_f64(entry.time_ms / 1000.0),
                    positions_evaluated: entry.moves_evaluated.unwrap_or(0),
                    own_threat_score: entry.score.unwrap_or(0),
                    opponent_threat_score: entry.opponent.unwrap_or(0),
                    winning_move: entry.winner,
                })
            })
            .collect::<Result<_, _>>()?;

        let status = match self.winner {
            Winner::None => GameStatus::Running,
            Winner::Crosses => GameStatus::CrossesWon,
            Winner::Naughts => GameStatus::NaughtsWon,
            Winner::Draw => GameStatus::Draw,
        };
        let current_player = self.engine_role();

        Ok(GameState::restore(
            config,
            board,
            history,
            status,
            current_player,
            Duration::from_secs_f64(self.crosses.time_ms / 1000.0),
            Duration::from_secs_f64(self.naughts.time_ms / 1000.0),
        ))
    }
}

fn kind_to_wire(kind: PlayerKind) -> SideKind {
    match kind {
        PlayerKind::Human => SideKind::Human,
        PlayerKind::Ai => SideKind::Ai,
    }
}

fn wire_to_kind(kind: SideKind) -> PlayerKind {
    match kind {
        SideKind::Human => PlayerKind::Human,
        SideKind::Ai => PlayerKind::Ai,
    }
}
