use crate::types::{MoveLabel, PlyRecord};
use chess::{Side, StartPosition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A finished analysis, shared between the worker and any consumer.
///
/// Cloning the `Arc` acquires a reference and dropping it releases one.
pub type SharedAnalysis = Arc<AnalysisResult>;

/// Per-side summary of a finished analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub plies: u32,
    /// Average centipawn loss; 0 for a side that made no moves.
    pub acpl: f64,
    pub best: u32,
    pub excellent: u32,
    pub good: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
    /// Accuracy percentage (0-100).
    pub accuracy: f64,
}

impl PlayerStats {
    fn from_plies<'a>(plies: impl Iterator<Item = &'a PlyRecord>) -> Self {
        let mut stats = Self::default();
        let mut total_loss: i64 = 0;

        for ply in plies {
            stats.plies += 1;
            total_loss += i64::from(ply.centipawn_loss);
            match ply.label {
                MoveLabel::Best | MoveLabel::Brilliant => stats.best += 1,
                MoveLabel::Excellent => stats.excellent += 1,
                MoveLabel::Good => stats.good += 1,
                MoveLabel::Inaccuracy => stats.inaccuracies += 1,
                MoveLabel::Mistake => stats.mistakes += 1,
                MoveLabel::Blunder => stats.blunders += 1,
                MoveLabel::None => {}
            }
        }

        if stats.plies > 0 {
            stats.acpl = total_loss as f64 / f64::from(stats.plies);
            stats.accuracy = compute_accuracy(stats.acpl);
        } else {
            stats.accuracy = 100.0;
        }
        stats
    }
}

/// Accuracy percentage from average centipawn loss.
/// Uses the formula: accuracy = 103.1668 * exp(-0.006 * acpl) - 3.1668
/// Clamped to [0, 100].
pub fn compute_accuracy(acpl: f64) -> f64 {
    let raw = 103.1668 * (-0.006 * acpl).exp() - 3.1668;
    raw.clamp(0.0, 100.0)
}

/// Every analysed ply of a game plus per-side summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_plies: usize,
    pub start: StartPosition,
    /// Name the engine reported during the handshake.
    pub engine_name: Option<String>,
    pub plies: Vec<PlyRecord>,
    pub white: PlayerStats,
    pub black: PlayerStats,
}

impl AnalysisResult {
    /// Aggregate finished plies. Only called once every ply is final.
    pub fn finalize(
        start: StartPosition,
        engine_name: Option<String>,
        plies: Vec<PlyRecord>,
    ) -> Self {
        let white = PlayerStats::from_plies(plies.iter().filter(|p| p.side_to_move == Side::White));
        let black = PlayerStats::from_plies(plies.iter().filter(|p| p.side_to_move == Side::Black));
        Self {
            total_plies: plies.len(),
            start,
            engine_name,
            plies,
            white,
            black,
        }
    }

    pub fn into_shared(self) -> SharedAnalysis {
        Arc::new(self)
    }

    pub fn stats(&self, side: Side) -> &PlayerStats {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn white_acpl(&self) -> f64 {
        self.white.acpl
    }

    pub fn black_acpl(&self) -> f64 {
        self.black.acpl
    }

    pub fn white_mistakes(&self) -> u32 {
        self.white.mistakes
    }

    pub fn white_blunders(&self) -> u32 {
        self.white.blunders
    }

    pub fn black_mistakes(&self) -> u32 {
        self.black.mistakes
    }

    pub fn black_blunders(&self) -> u32 {
        self.black.blunders
    }
}
