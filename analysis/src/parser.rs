//! Stateful accumulation of engine `info` reports into a [`PlyRecord`].

use crate::types::{PlyRecord, VariationLine, MAX_MULTIPV};
use engine::{is_info_line, parse_uci_message, EngineInfo, UciMessage};

impl PlyRecord {
    /// Merge one parsed `info` report into the record.
    ///
    /// Only reports carrying a `pv` touch the record. A slot outside
    /// `1..=max_multipv` (capped at [`MAX_MULTIPV`]) is ignored, and a stored
    /// slot is only replaced by a report at least as deep as the stored one.
    /// A report without `multipv` is slot 1; one with an unreadable
    /// `multipv` value is dropped. Returns whether a slot was replaced.
    pub fn apply_info(&mut self, info: &EngineInfo, max_multipv: usize) -> bool {
        if !info.has_pv {
            return false;
        }

        let slot = info.multipv.unwrap_or(1) as usize;
        if slot == 0 || slot > max_multipv.min(MAX_MULTIPV) {
            return false;
        }

        let depth = info.depth.unwrap_or(0);
        if let Some(stored) = self.lines.get(slot - 1) {
            if stored.slot != 0 && depth < stored.depth {
                return false;
            }
        }

        if self.lines.len() < slot {
            self.lines.resize(slot, VariationLine::default());
        }

        let score = info.score.unwrap_or_default().clamped();
        self.lines[slot - 1] = VariationLine {
            slot: slot as u8,
            depth,
            seldepth: info.seldepth.unwrap_or(0),
            score,
            bound: info.bound,
            moves: info.pv.clone(),
        };

        if slot == 1 {
            self.primary_depth = depth;
            self.eval_white = score.value();
            self.is_mate = score.is_mate();
            self.mate_distance_white = if score.is_mate() { score.value() } else { 0 };
        }

        true
    }
}

/// Feed one raw engine line to the record. Anything that is not a
/// well-formed `info` line is noise and ignored.
pub fn apply_uci_line(record: &mut PlyRecord, line: &str, max_multipv: usize) -> bool {
    if !is_info_line(line) {
        return false;
    }
    match parse_uci_message(line) {
        Ok(UciMessage::Info(info)) => record.apply_info(&info, max_multipv),
        _ => false,
    }
}
