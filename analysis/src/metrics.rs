//! Per-ply move quality: centipawn loss, best-move rank, label, only-move.

use crate::types::{MoveLabel, PlyRecord};
use chess::Side;

/// Largest centipawn loss recorded for a single move.
pub const MAX_CP_LOSS: i32 = 2000;

/// Penalty applied to a played move that is missing from the reported lines.
pub const UNLISTED_MOVE_PENALTY: i32 = 100;

/// Gap between the top two lines above which the best move is "the only move".
pub const ONLY_MOVE_GAP: i32 = 150;

impl PlyRecord {
    /// Derive the move-quality fields from the reported lines.
    ///
    /// Expects a normalized record; everything is compared on the folded,
    /// White-relative scale. Placeholder slots are skipped, so the best score
    /// is the highest-ranked slot the engine actually reported.
    pub fn score_played_move(&mut self) {
        debug_assert!(self.is_normalized(), "metrics need White-relative scores");

        let best_score = self
            .lines
            .iter()
            .find(|l| l.slot != 0)
            .map(|l| l.score.fold())
            .unwrap_or(0);

        let matched = self
            .lines
            .iter()
            .enumerate()
            .find(|(_, line)| {
                line.slot != 0
                    && line
                        .first_move()
                        .is_some_and(|mv| mv.matches_uci(&self.played_move))
            })
            .map(|(idx, line)| (idx + 1, line.score.fold()));

        let played_score = match (matched, self.lines.last()) {
            (Some((rank, score)), _) => {
                self.best_move_rank = rank as u8;
                score
            }
            (None, Some(worst)) => {
                self.best_move_rank = 0;
                match self.side_to_move {
                    Side::White => worst.score.fold().saturating_sub(UNLISTED_MOVE_PENALTY),
                    Side::Black => worst.score.fold().saturating_add(UNLISTED_MOVE_PENALTY),
                }
            }
            (None, None) => {
                self.best_move_rank = 0;
                best_score
            }
        };

        let loss = match self.side_to_move {
            Side::White => best_score.saturating_sub(played_score),
            Side::Black => played_score.saturating_sub(best_score),
        };

        self.played_move_eval = played_score;
        self.centipawn_loss = loss.clamp(0, MAX_CP_LOSS);
        self.label = MoveLabel::from_metrics(self.best_move_rank, self.centipawn_loss);
        self.is_only_move = match (self.lines.first(), self.lines.get(1)) {
            (Some(first), Some(second)) if first.slot != 0 && second.slot != 0 => {
                first.score.fold().saturating_sub(second.score.fold()).saturating_abs()
                    > ONLY_MOVE_GAP
            }
            _ => false,
        };
    }
}
