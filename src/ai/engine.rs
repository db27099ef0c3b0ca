use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, warn};
use rand::Rng;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

use crate::ai::minimax::{INFINITY, Minimax, SearchContext, WIN_VALUE};
use crate::ai::move_ordering::MoveOrdering;
use crate::ai::report::{Perspective, ScoringEntry, ScoringReport, Stage};
use crate::ai::threat::{
    THREAT_BROKEN_FOUR, THREAT_CLOSED_FOUR, THREAT_DOUBLE_OPEN_THREE, THREAT_FIVE,
    THREAT_OPEN_THREE, THREAT_THREE_CLUSTER, ThreatClassifier,
};
use crate::ai::transposition::TT_SIZE;
use crate::ai::vct::{VCT_DEPTH_LIMIT, VctSearcher};
use crate::core::board::Player;
use crate::core::moves::MoveGenerator;
use crate::core::state::{GameState, GameStatus};
use crate::error::EngineError;

/// Everything a front end needs to know about one chosen move.
#[derive(Debug, Clone)]
pub struct Decision {
    pub row: usize,
    pub col: usize,
    pub positions_evaluated: u64,
    pub own_score: i32,
    pub opponent_score: i32,
    pub elapsed: std::time::Duration,
    pub timed_out: bool,
}

impl Decision {
    /// One-line summary for display next to the move.
    pub fn status_line(&self) -> String {
        if self.timed_out {
            format!("timeout, checked {} moves", self.positions_evaluated)
        } else {
            format!(
                "searched {} positions in {:.2}s",
                self.positions_evaluated,
                self.elapsed.as_secs_f64()
            )
        }
    }
}

/// Move-selection engine: a cascade of tactical stages ending in iterative
/// deepening minimax. One instance serves one game at a time; its table,
/// killer slots and random state persist across root moves.
pub struct Engine {
    ctx: SearchContext,
    rng: ChaCha8Rng,
    busy: AtomicBool,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_seed(rand::random::<u64>())
    }

    /// Fixing the seed makes tie-breaking reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            ctx: SearchContext::new(TT_SIZE),
            rng: ChaCha8Rng::seed_from_u64(seed),
            busy: AtomicBool::new(false),
        }
    }

    /// True from the start of `decide_move` until it returns. Load
    /// balancers read this to answer readiness checks.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Forget everything learned in previous searches. Useful when the
    /// same instance is reused for a fresh game.
    pub fn clear_table(&mut self) {
        self.ctx.tt.clear();
        self.ctx.killers = Default::default();
    }

    pub fn nodes_searched(&self) -> u64 {
        self.ctx.nodes
    }

    /// Pick a move for the side to move. Never fails to produce a move
    /// while an empty candidate cell exists; a report handle, when given,
    /// receives one audit entry per cascade stage.
    pub fn decide_move(
        &mut self,
        state: &mut GameState,
        report: Option<&mut ScoringReport>,
    ) -> Result<Decision, EngineError> {
        self.busy.store(true, Ordering::SeqCst);
        let decision = self.run_cascade(state, report);
        self.busy.store(false, Ordering::SeqCst);
        decision
    }

    fn run_cascade(
        &mut self,
        state: &mut GameState,
        mut report: Option<&mut ScoringReport>,
    ) -> Result<Decision, EngineError> {
        if state.status() != GameStatus::Running {
            return Err(EngineError::GameOver);
        }

        let ai = state.current_player();
        let radius = state.config().clamped_radius();
        let max_depth = state.config().side(ai).depth.max(1);

        self.ctx.begin(state.config().timeout);
        let start = Instant::now();
        if let Some(rep) = report.as_deref_mut() {
            rep.clear();
        }

        // The very first stone goes to the centre, no search involved.
        if state.board().is_empty() {
            let (row, col) = state.board().center();
            Self::record(
                &mut report,
                Self::entry(Stage::Opening, Perspective::Own, 1, 0, start, true, vec![(row, col)]),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }

        let candidates = MoveGenerator::candidates(state.board(), radius);
        if candidates.is_empty() {
            return Err(EngineError::NoMoves);
        }

        let own_threats: Vec<i32> = candidates
            .iter()
            .map(|&(row, col)| ThreatClassifier::evaluate(state.board(), row, col, ai))
            .collect();
        let opp_threats: Vec<i32> = candidates
            .iter()
            .map(|&(row, col)| ThreatClassifier::evaluate(state.board(), row, col, ai.other()))
            .collect();
        let own_max = own_threats.iter().copied().max().unwrap_or(0);
        let opp_max = opp_threats.iter().copied().max().unwrap_or(0);
        if let Some(rep) = report.as_deref_mut() {
            rep.offensive_max_score = own_max;
            rep.defensive_max_score = opp_max;
        }

        // Stage: win on the spot.
        let stage_start = Instant::now();
        if own_max >= THREAT_FIVE {
            let winning: Vec<(usize, usize)> = candidates
                .iter()
                .zip(&own_threats)
                .filter(|&(_, &threat)| threat >= THREAT_FIVE)
                .map(|(&mv, _)| mv)
                .collect();
            let (row, col) = self.choose(&winning);
            Self::record(
                &mut report,
                Self::entry(
                    Stage::HaveWin,
                    Perspective::Own,
                    candidates.len(),
                    own_max,
                    stage_start,
                    true,
                    vec![(row, col)],
                ),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::HaveWin,
                Perspective::Own,
                candidates.len(),
                own_max,
                stage_start,
                false,
                vec![],
            ),
        );

        // Stage: the opponent is about to complete something unanswerable,
        // block the strongest such cell.
        let stage_start = Instant::now();
        if opp_max >= THREAT_DOUBLE_OPEN_THREE {
            let blockers: Vec<(usize, usize)> = candidates
                .iter()
                .zip(&opp_threats)
                .filter(|&(_, &threat)| threat == opp_max)
                .map(|(&mv, _)| mv)
                .collect();
            let (row, col) = self.choose(&blockers);
            Self::record(
                &mut report,
                Self::entry(
                    Stage::BlockThreat,
                    Perspective::Opponent,
                    candidates.len(),
                    opp_max,
                    stage_start,
                    true,
                    vec![(row, col)],
                ),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::BlockThreat,
                Perspective::Opponent,
                candidates.len(),
                opp_max,
                stage_start,
                false,
                vec![],
            ),
        );

        // Opening reply: the second stone lands within two of the first,
        // chosen uniformly, skipping the deeper stages entirely.
        if state.board().stones() == 1 {
            let (stone_row, stone_col) =
                state.board().lone_stone().expect("exactly one stone on the board");
            let mut near: Vec<(usize, usize)> = Vec::new();
            for dr in -2i32..=2 {
                for dc in -2i32..=2 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let r = stone_row as i32 + dr;
                    let c = stone_col as i32 + dc;
                    if state.board().in_bounds(r, c)
                        && state.board().is_empty_cell(r as usize, c as usize)
                    {
                        near.push((r as usize, c as usize));
                    }
                }
            }
            let (row, col) = self.choose(&near);
            Self::record(
                &mut report,
                Self::entry(
                    Stage::Opening,
                    Perspective::Own,
                    near.len(),
                    0,
                    start,
                    true,
                    vec![(row, col)],
                ),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }

        // Stage: our own forcing line of fours.
        let stage_start = Instant::now();
        let nodes_before = self.ctx.nodes;
        if let Some(sequence) = VctSearcher::find_forced_win(&mut self.ctx, state, ai, VCT_DEPTH_LIMIT)
        {
            let (row, col) = sequence[0];
            Self::record(
                &mut report,
                Self::entry(
                    Stage::HaveVct,
                    Perspective::Own,
                    (self.ctx.nodes - nodes_before) as usize,
                    own_max,
                    stage_start,
                    true,
                    sequence,
                ),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::HaveVct,
                Perspective::Own,
                (self.ctx.nodes - nodes_before) as usize,
                own_max,
                stage_start,
                false,
                vec![],
            ),
        );

        // Stage: the opponent has a forcing line, break it.
        let stage_start = Instant::now();
        let nodes_before = self.ctx.nodes;
        if let Some((row, col)) =
            VctSearcher::find_forced_win_block(&mut self.ctx, state, ai, VCT_DEPTH_LIMIT)
        {
            Self::record(
                &mut report,
                Self::entry(
                    Stage::BlockVct,
                    Perspective::Opponent,
                    (self.ctx.nodes - nodes_before) as usize,
                    opp_max,
                    stage_start,
                    true,
                    vec![(row, col)],
                ),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::BlockVct,
                Perspective::Opponent,
                (self.ctx.nodes - nodes_before) as usize,
                opp_max,
                stage_start,
                false,
                vec![],
            ),
        );

        // Stage: deny the opponent an open three unless we hold the
        // initiative ourselves.
        let stage_start = Instant::now();
        let band: Vec<usize> = (0..candidates.len())
            .filter(|&i| {
                let threat = opp_threats[i];
                threat == THREAT_OPEN_THREE
                    || (THREAT_THREE_CLUSTER..THREAT_DOUBLE_OPEN_THREE).contains(&threat)
            })
            .collect();
        let band_max = band.iter().map(|&i| opp_threats[i]).max().unwrap_or(0);
        if !band.is_empty() {
            let our_fours = own_threats
                .iter()
                .filter(|&&threat| threat >= THREAT_BROKEN_FOUR)
                .count();
            let our_open_threes = own_threats
                .iter()
                .filter(|&&threat| threat == THREAT_OPEN_THREE)
                .count();
            let initiative = own_max >= THREAT_DOUBLE_OPEN_THREE
                || our_fours >= 2
                || (our_fours >= 1 && our_open_threes >= 1)
                || (own_max >= THREAT_OPEN_THREE && own_max > band_max);
            if !initiative {
                let best_blockers: Vec<usize> = band
                    .iter()
                    .copied()
                    .filter(|&i| opp_threats[i] == band_max)
                    .collect();
                let best_own = best_blockers
                    .iter()
                    .map(|&i| own_threats[i])
                    .max()
                    .expect("blocker set is nonempty");
                let picks: Vec<(usize, usize)> = best_blockers
                    .into_iter()
                    .filter(|&i| own_threats[i] == best_own)
                    .map(|i| candidates[i])
                    .collect();
                let (row, col) = self.choose(&picks);
                Self::record(
                    &mut report,
                    Self::entry(
                        Stage::BlockOpenThree,
                        Perspective::Opponent,
                        candidates.len(),
                        band_max,
                        stage_start,
                        true,
                        vec![(row, col)],
                    ),
                );
                return Ok(self.decision(state, ai, row, col, start));
            }
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::BlockOpenThree,
                Perspective::Opponent,
                candidates.len(),
                band_max,
                stage_start,
                false,
                vec![],
            ),
        );

        // Stage: press a four even without a proven forcing line.
        let stage_start = Instant::now();
        if own_max >= THREAT_CLOSED_FOUR {
            let picks: Vec<(usize, usize)> = candidates
                .iter()
                .zip(&own_threats)
                .filter(|&(_, &threat)| threat == own_max)
                .map(|(&mv, _)| mv)
                .collect();
            let (row, col) = self.choose(&picks);
            Self::record(
                &mut report,
                Self::entry(
                    Stage::ForcingFour,
                    Perspective::Own,
                    candidates.len(),
                    own_max,
                    stage_start,
                    true,
                    vec![(row, col)],
                ),
            );
            return Ok(self.decision(state, ai, row, col, start));
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::ForcingFour,
                Perspective::Own,
                candidates.len(),
                own_max,
                stage_start,
                false,
                vec![],
            ),
        );

        // Stage: iterative deepening minimax over the candidates. Each
        // completed iteration replaces the previous best; a timeout keeps
        // the last completed one.
        let stage_start = Instant::now();
        let mut best_move = candidates[0];
        let mut best_score = 0;
        for target_depth in 1..=max_depth {
            if self.ctx.deadline_passed() {
                self.ctx.timed_out = true;
                break;
            }
            let mut ordered = candidates.clone();
            MoveOrdering::order(state.board(), &mut ordered, ai, &self.ctx.killers, target_depth);

            let mut iteration_best = -INFINITY;
            let mut ties: Vec<(usize, usize)> = Vec::new();
            let mut won_early = false;
            for &(row, col) in &ordered {
                if self.ctx.deadline_passed() {
                    self.ctx.timed_out = true;
                    break;
                }
                let child_hash = state.zobrist().toggle(state.hash(), row, col, ai);
                state.board_mut().place(row, col, ai);
                let value = Minimax::search(
                    &mut self.ctx,
                    state,
                    child_hash,
                    target_depth - 1,
                    -INFINITY,
                    INFINITY,
                    false,
                    ai,
                    Some((row, col)),
                );
                state.board_mut().clear(row, col);
                if self.ctx.timed_out {
                    break;
                }
                if value > iteration_best {
                    iteration_best = value;
                    ties.clear();
                    ties.push((row, col));
                } else if value == iteration_best {
                    ties.push((row, col));
                }
                if value >= WIN_VALUE - 1000 {
                    won_early = true;
                    break;
                }
            }
            if self.ctx.timed_out {
                warn!(
                    "search timed out in depth {target_depth} iteration after {} nodes",
                    self.ctx.nodes
                );
                break;
            }
            best_move = self.choose(&ties);
            best_score = iteration_best;
            debug!(
                "depth {target_depth}: best ({}, {}) score {} after {} nodes",
                best_move.0, best_move.1, best_score, self.ctx.nodes
            );
            if won_early {
                break;
            }
        }
        Self::record(
            &mut report,
            Self::entry(
                Stage::Minimax,
                Perspective::Own,
                candidates.len(),
                best_score,
                stage_start,
                true,
                vec![best_move],
            ),
        );
        Ok(self.decision(state, ai, best_move.0, best_move.1, start))
    }

    fn decision(
        &self,
        state: &GameState,
        ai: Player,
        row: usize,
        col: usize,
        start: Instant,
    ) -> Decision {
        Decision {
            row,
            col,
            positions_evaluated: self.ctx.nodes,
            own_score: ThreatClassifier::evaluate(state.board(), row, col, ai),
            opponent_score: ThreatClassifier::evaluate(state.board(), row, col, ai.other()),
            elapsed: start.elapsed(),
            timed_out: self.ctx.timed_out,
        }
    }

    fn choose(&mut self, options: &[(usize, usize)]) -> (usize, usize) {
        debug_assert!(!options.is_empty());
        options[self.rng.random_range(0..options.len())]
    }

    fn record(report: &mut Option<&mut ScoringReport>, entry: ScoringEntry) {
        if let Some(rep) = report.as_deref_mut() {
            rep.push(entry);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn entry(
        stage: Stage,
        perspective: Perspective,
        moves_evaluated: usize,
        score: i32,
        started: Instant,
        decisive: bool,
        sequence: Vec<(usize, usize)>,
    ) -> ScoringEntry {
        ScoringEntry {
            stage,
            perspective,
            moves_evaluated,
            score,
            wall_ms: started.elapsed().as_secs_f64() * 1000.0,
            decisive,
            sequence,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
