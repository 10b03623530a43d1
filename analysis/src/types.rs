use chess::{AnalysisScore, CompactMove, ScoreBound, Side};
use engine::MAX_PV_MOVES;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Most MultiPV slots stored per ply.
pub const MAX_MULTIPV: usize = 5;

/// Qualitative label for a played move.
///
/// `Inaccuracy` and `Brilliant` are never assigned by the centipawn-loss
/// rule; they are kept for richer classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveLabel {
    #[default]
    None,
    /// Top engine line, or within 10 cp of it.
    Best,
    /// Within 25 cp of best.
    Excellent,
    /// Within 50 cp of best.
    Good,
    Inaccuracy,
    /// 51-150 cp worse than best.
    Mistake,
    /// More than 150 cp worse than best.
    Blunder,
    Brilliant,
}

impl MoveLabel {
    /// Label from best-move rank (0 = not among the reported lines) and
    /// centipawn loss. Rank 1 is always `Best`.
    pub fn from_metrics(rank: u8, cp_loss: i32) -> Self {
        if rank == 1 {
            return Self::Best;
        }
        match cp_loss {
            i32::MIN..=10 => Self::Best,
            11..=25 => Self::Excellent,
            26..=50 => Self::Good,
            51..=150 => Self::Mistake,
            _ => Self::Blunder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Best => "best",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Inaccuracy => "inaccuracy",
            Self::Mistake => "mistake",
            Self::Blunder => "blunder",
            Self::Brilliant => "brilliant",
        }
    }
}

impl std::fmt::Display for MoveLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One MultiPV slot: the deepest report seen for it during a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariationLine {
    /// 1-based MultiPV index; 0 for a slot that was never reported.
    pub slot: u8,
    pub depth: u32,
    pub seldepth: u32,
    /// Side-to-move relative while parsing, White-relative once the ply
    /// record is normalized.
    pub score: AnalysisScore,
    pub bound: ScoreBound,
    pub moves: SmallVec<[CompactMove; MAX_PV_MOVES]>,
}

impl VariationLine {
    pub fn first_move(&self) -> Option<CompactMove> {
        self.moves.first().copied()
    }
}

/// Analysis of the move played at one ply.
///
/// Built by the worker in three steps: slot updates while the engine
/// searches, one perspective flip, then metrics. Never modified afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlyRecord {
    pub ply_index: usize,
    pub side_to_move: Side,
    /// The move actually played, in UCI notation.
    pub played_move: String,

    /// Slot 1 score value (centipawns, or mate distance when `is_mate`).
    pub eval_white: i32,
    pub is_mate: bool,
    pub mate_distance_white: i32,
    pub primary_depth: u32,
    /// Reported slots; the length is the highest slot index seen.
    pub lines: SmallVec<[VariationLine; MAX_MULTIPV]>,

    /// Folded score of the played move, White-relative.
    pub played_move_eval: i32,
    /// 1-based slot of the played move, 0 if it was not reported.
    pub best_move_rank: u8,
    pub centipawn_loss: i32,
    pub label: MoveLabel,
    pub is_only_move: bool,
    /// Flagged for the refinement pass.
    pub is_critical: bool,
    /// Search time that produced this record.
    pub movetime_ms: u64,

    #[serde(skip)]
    normalized: bool,
}

impl PlyRecord {
    pub fn new(ply_index: usize, side_to_move: Side, played_move: impl Into<String>) -> Self {
        Self {
            ply_index,
            side_to_move,
            played_move: played_move.into(),
            ..Default::default()
        }
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Slot 1 evaluation as a score.
    pub fn eval(&self) -> AnalysisScore {
        if self.is_mate {
            AnalysisScore::Mate(self.mate_distance_white)
        } else {
            AnalysisScore::Centipawns(self.eval_white)
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Flip every stored score to White's point of view.
    ///
    /// Engines report scores for the side to move, so a Black ply is negated.
    /// Applies once; later calls are no-ops.
    pub fn normalize_perspective(&mut self) {
        if self.normalized {
            return;
        }
        self.normalized = true;

        if self.side_to_move == Side::White {
            return;
        }

        self.eval_white = self.eval_white.saturating_neg();
        if self.is_mate {
            self.mate_distance_white = self.mate_distance_white.saturating_neg();
        }
        for line in &mut self.lines {
            line.score = line.score.negate();
        }
    }
}
