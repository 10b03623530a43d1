use crate::{EngineInfo, MAX_PV_MOVES};
use chess::{AnalysisScore, CompactMove, ScoreBound, MAX_ENGINE_SCORE};

/// Incoming message from UCI engine
#[derive(Debug, Clone, PartialEq)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    /// `mv` is `None` for `bestmove (none)` (no legal move in the position).
    BestMove {
        mv: Option<CompactMove>,
        ponder: Option<CompactMove>,
    },
    Info(EngineInfo),
}

/// Whether the line is an `info` report.
pub fn is_info_line(line: &str) -> bool {
    line.starts_with("info")
}

/// Whether the line ends the current search.
pub fn is_bestmove_line(line: &str) -> bool {
    line.starts_with("bestmove")
}

/// Parse a UCI message line
pub fn parse_uci_message(line: &str) -> Result<UciMessage, crate::UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(crate::UciError::MalformedMessage(line.to_string()));
            }
            let name = tokens[1].to_string();
            let value = tokens[2..].join(" ");
            Ok(UciMessage::Id { name, value })
        }

        Some(&"bestmove") => {
            if tokens.len() < 2 {
                return Err(crate::UciError::MalformedMessage(line.to_string()));
            }
            let mv = if tokens[1] == "(none)" {
                None
            } else {
                Some(parse_move(tokens[1])?)
            };
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
                Some(parse_move(tokens[3])?)
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }

        Some(&"info") => Ok(UciMessage::Info(parse_info_line(&tokens[1..]))),

        _ => Err(crate::UciError::UnknownMessage(line.to_string())),
    }
}

fn parse_move(s: &str) -> Result<CompactMove, crate::UciError> {
    CompactMove::from_uci(s).ok_or_else(|| crate::UciError::InvalidMove(s.to_string()))
}

/// Parse the tokens following `info`.
///
/// Everything after `pv` is the move sequence; moves past [`MAX_PV_MOVES`]
/// are dropped and malformed moves decode to [`CompactMove::NULL`].
fn parse_info_line(tokens: &[&str]) -> EngineInfo {
    let mut info = EngineInfo::default();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                info.depth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "seldepth" => {
                i += 1;
                info.seldepth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "multipv" => {
                i += 1;
                info.multipv = Some(tokens.get(i).and_then(|s| s.parse().ok()).unwrap_or(0));
            }
            "time" => {
                i += 1;
                info.time_ms = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "nodes" => {
                i += 1;
                info.nodes = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "nps" => {
                i += 1;
                info.nps = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "hashfull" => {
                i += 1;
                info.hashfull = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "currmove" => {
                i += 1;
                info.currmove = tokens.get(i).and_then(|s| CompactMove::from_uci(s));
            }
            "score" => {
                i += 1;
                if let Some(&score_type) = tokens.get(i) {
                    i += 1;
                    if let Some(value_str) = tokens.get(i) {
                        info.score = match score_type {
                            "cp" => parse_score_value(value_str).map(AnalysisScore::Centipawns),
                            "mate" => parse_score_value(value_str).map(AnalysisScore::Mate),
                            _ => None,
                        };
                    }
                }
                match tokens.get(i + 1) {
                    Some(&"lowerbound") => {
                        info.bound = ScoreBound::Lower;
                        i += 1;
                    }
                    Some(&"upperbound") => {
                        info.bound = ScoreBound::Upper;
                        i += 1;
                    }
                    _ => {}
                }
            }
            "pv" => {
                info.has_pv = true;
                info.pv = tokens[i + 1..]
                    .iter()
                    .take(MAX_PV_MOVES)
                    .map(|s| CompactMove::decode(s))
                    .collect();
                break;
            }
            "string" => {
                info.string = Some(tokens[i + 1..].join(" "));
                break;
            }
            _ => {
                // Unknown keyword, skip
            }
        }
        i += 1;
    }

    info
}

/// Score value limited to `±MAX_ENGINE_SCORE`.
fn parse_score_value(value: &str) -> Option<i32> {
    let value: i64 = value.parse().ok()?;
    let limit = i64::from(MAX_ENGINE_SCORE);
    i32::try_from(value.clamp(-limit, limit)).ok()
}
