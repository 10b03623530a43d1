//! Plain-text rendering of an analysis result.

use std::fmt::Write;

use analysis::{AnalysisResult, PlayerStats, PlyRecord, Side};

pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();

    if let Some(name) = &result.engine_name {
        let _ = writeln!(out, "Engine: {}", name);
    }
    let _ = writeln!(
        out,
        "{:>4}  {:<5}  {:<6} {:>7}  {:<6} {:>4} {:>5}  {}",
        "ply", "side", "move", "eval", "best", "rank", "loss", "label"
    );
    for ply in &result.plies {
        let _ = writeln!(out, "{}", ply_row(ply));
    }

    out.push('\n');
    for side in [Side::White, Side::Black] {
        let _ = writeln!(out, "{}", summary_row(side, result.stats(side)));
    }
    out
}

fn ply_row(ply: &PlyRecord) -> String {
    let best = ply
        .lines
        .first()
        .and_then(|l| l.first_move())
        .map(|mv| mv.to_uci())
        .unwrap_or_else(|| "-".to_string());
    let rank = match ply.best_move_rank {
        0 => "-".to_string(),
        r => r.to_string(),
    };
    let mut label = ply.label.to_string();
    if ply.is_only_move {
        label.push_str(" (only move)");
    }
    if ply.is_critical {
        label.push_str(" *");
    }

    format!(
        "{:>4}  {:<5}  {:<6} {:>7}  {:<6} {:>4} {:>5}  {}",
        ply.ply_index + 1,
        ply.side_to_move,
        ply.played_move,
        ply.eval().display(),
        best,
        rank,
        ply.centipawn_loss,
        label
    )
}

fn summary_row(side: Side, stats: &PlayerStats) -> String {
    format!(
        "{:<5}  moves {:>3}  acpl {:>6.1}  accuracy {:>5.1}%  mistakes {}  blunders {}",
        side, stats.plies, stats.acpl, stats.accuracy, stats.mistakes, stats.blunders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::{AnalysisScore, MoveLabel, StartPosition, VariationLine};
    use chess::CompactMove;

    fn ply() -> PlyRecord {
        let mut rec = PlyRecord::new(0, Side::White, "e2e4");
        rec.eval_white = 35;
        rec.best_move_rank = 1;
        rec.label = MoveLabel::Best;
        let mut line = VariationLine {
            slot: 1,
            depth: 18,
            score: AnalysisScore::Centipawns(35),
            ..Default::default()
        };
        line.moves.push(CompactMove::decode("e2e4"));
        rec.lines.push(line);
        rec
    }

    #[test]
    fn test_ply_row() {
        let row = ply_row(&ply());
        assert!(row.contains("white"));
        assert!(row.contains("+0.35"));
        assert!(row.ends_with("best"));
    }

    #[test]
    fn test_marks_critical_and_only_move() {
        let mut rec = ply();
        rec.is_critical = true;
        rec.is_only_move = true;
        assert!(ply_row(&rec).ends_with("best (only move) *"));
    }

    #[test]
    fn test_render_includes_summary() {
        let result = AnalysisResult::finalize(
            StartPosition::Standard,
            Some("Stockfish 17".to_string()),
            vec![ply()],
        );
        let text = render(&result);
        assert!(text.starts_with("Engine: Stockfish 17"));
        assert!(text.contains("white  moves   1  acpl    0.0  accuracy 100.0%"));
        assert!(text.contains("black  moves   0"));
    }
}
