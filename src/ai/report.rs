use serde::{Deserialize, Serialize};

/// At most this many entries are kept per decision.
pub const MAX_REPORT_ENTRIES: usize = 16;

/// Forcing lines attached to an entry are clipped to this many moves.
pub const MAX_SEQUENCE_MOVES: usize = 20;

/// Whose threats a cascade stage was measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perspective {
    #[serde(rename = "self")]
    Own,
    #[serde(rename = "opponent")]
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Opening,
    HaveWin,
    BlockThreat,
    HaveVct,
    BlockVct,
    BlockOpenThree,
    ForcingFour,
    Minimax,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Opening => "opening",
            Stage::HaveWin => "have_win",
            Stage::BlockThreat => "block_threat",
            Stage::HaveVct => "have_vct",
            Stage::BlockVct => "block_vct",
            Stage::BlockOpenThree => "block_open_three",
            Stage::ForcingFour => "forcing_four",
            Stage::Minimax => "minimax",
        }
    }
}

/// One cascade stage's audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringEntry {
    pub stage: Stage,
    pub perspective: Perspective,
    pub moves_evaluated: usize,
    pub score: i32,
    pub wall_ms: f64,
    pub decisive: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequence: Vec<(usize, usize)>,
}

/// Ordered audit trail of one decision. Exactly one entry is decisive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringReport {
    entries: Vec<ScoringEntry>,
    pub offensive_max_score: i32,
    pub defensive_max_score: i32,
}

impl ScoringReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries past the capacity are dropped rather than reallocating.
    pub fn push(&mut self, mut entry: ScoringEntry) {
        if self.entries.len() >= MAX_REPORT_ENTRIES {
            return;
        }
        entry.sequence.truncate(MAX_SEQUENCE_MOVES);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ScoringEntry] {
        &self.entries
    }

    pub fn decisive_entry(&self) -> Option<&ScoringEntry> {
        self.entries.iter().find(|entry| entry.decisive)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.offensive_max_score = 0;
        self.defensive_max_score = 0;
    }
}
