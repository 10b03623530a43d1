use crate::types::PlyRecord;

/// Centipawn loss that alone makes a ply critical.
const CRITICAL_CP_LOSS: i32 = 50;

/// Eval change against the previous ply counted as a swing.
const EVAL_SWING: i32 = 150;

/// Determine if a ply deserves a deeper second search.
///
/// Critical when cp_loss > 50, or when >= 2 of these signals fire:
/// 1. Eval swing > 150cp compared to the previous ply
/// 2. Only one good move in the position
/// 3. The top line is a forced mate
pub fn is_critical_ply(ply: &PlyRecord, prev: Option<&PlyRecord>) -> bool {
    if ply.centipawn_loss > CRITICAL_CP_LOSS {
        return true;
    }

    let mut signals = 0u8;

    if let Some(prev) = prev {
        if ply.eval().fold().saturating_sub(prev.eval().fold()).saturating_abs() > EVAL_SWING {
            signals += 1;
        }
    }

    if ply.is_only_move {
        signals += 1;
    }

    if ply.lines.first().is_some_and(|l| l.slot == 1 && l.score.is_mate()) {
        signals += 1;
    }

    signals >= 2
}

/// Set `is_critical` on every ply of a finished first pass.
pub fn mark_critical(plies: &mut [PlyRecord]) -> usize {
    let mut count = 0;
    for i in 0..plies.len() {
        let (before, rest) = plies.split_at_mut(i);
        let ply = &mut rest[0];
        ply.is_critical = is_critical_ply(ply, before.last());
        if ply.is_critical {
            count += 1;
        }
    }
    count
}
