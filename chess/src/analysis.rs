//! Engine score types shared across the engine and analysis crates.

use serde::{Deserialize, Serialize};

/// Folded value of a mate score before the distance is subtracted.
pub const MATE_SCORE: i32 = 10_000;

/// Largest magnitude kept from an engine report, centipawns or mate distance.
pub const MAX_ENGINE_SCORE: i32 = 32_000;

/// Engine evaluation score.
///
/// Centipawns: positive = the side the score is relative to is better.
/// Mate: positive N = that side mates in N moves,
/// negative N = that side gets mated in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisScore {
    Centipawns(i32),
    Mate(i32),
}

impl Default for AnalysisScore {
    fn default() -> Self {
        Self::Centipawns(0)
    }
}

impl AnalysisScore {
    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m > 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.abs())
                }
            }
        }
    }

    /// Fold onto the centipawn scale for comparison.
    ///
    /// `Mate(n)` with `n > 0` becomes `10000 - n`, anything else `-10000 - n`,
    /// so a shorter mate always outranks a longer one.
    pub fn fold(&self) -> i32 {
        match self {
            Self::Centipawns(cp) => *cp,
            Self::Mate(m) => {
                if *m > 0 {
                    MATE_SCORE.saturating_sub(*m)
                } else {
                    (-MATE_SCORE).saturating_sub(*m)
                }
            }
        }
    }

    /// Negate the score (flip perspective).
    pub fn negate(&self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns(cp.saturating_neg()),
            Self::Mate(m) => Self::Mate(m.saturating_neg()),
        }
    }

    /// Limit the value to `±MAX_ENGINE_SCORE` so folding, negation and
    /// differences of two scores cannot overflow.
    pub fn clamped(&self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns((*cp).clamp(-MAX_ENGINE_SCORE, MAX_ENGINE_SCORE)),
            Self::Mate(m) => Self::Mate((*m).clamp(-MAX_ENGINE_SCORE, MAX_ENGINE_SCORE)),
        }
    }

    pub fn is_mate(&self) -> bool {
        matches!(self, Self::Mate(_))
    }

    /// Raw reported number: centipawns or mate distance.
    pub fn value(&self) -> i32 {
        match self {
            Self::Centipawns(v) | Self::Mate(v) => *v,
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// UCI `lowerbound` / `upperbound` qualifier on a reported score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoreBound {
    #[default]
    Exact,
    Lower,
    Upper,
}

/// The side making a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Side to move at 0-indexed `ply` when `first` moves at ply 0.
    pub fn for_ply(first: Side, ply: usize) -> Self {
        if ply % 2 == 0 {
            first
        } else {
            first.opposite()
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl From<cozy_chess::Color> for Side {
    fn from(c: cozy_chess::Color) -> Self {
        match c {
            cozy_chess::Color::White => Self::White,
            cozy_chess::Color::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
