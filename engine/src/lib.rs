pub mod process;
pub mod uci;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use process::{locate_engine, EngineProcess, EngineTransport, TransportError, MAX_LINE_BYTES};
pub use uci::{is_bestmove_line, is_info_line, parse_uci_message, UciError, UciMessage};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEngine, WhenIdle};

use chess::{AnalysisScore, CompactMove, ScoreBound, StartPosition};
use smallvec::SmallVec;

/// Longest principal variation kept from one `info` line.
pub const MAX_PV_MOVES: usize = 16;

/// Commands sent to the engine
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Uci,
    IsReady,
    SetOption { name: String, value: Option<String> },
    /// Start position plus every move played before the searched ply.
    Position {
        start: StartPosition,
        moves: Vec<String>,
    },
    Go(GoParams),
    Quit,
}

impl EngineCommand {
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        Self::SetOption {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Wire text of the command, without the trailing newline.
    pub fn to_uci(&self) -> String {
        match self {
            Self::Uci => "uci".to_string(),
            Self::IsReady => "isready".to_string(),
            Self::SetOption { name, value } => match value {
                Some(val) => format!("setoption name {} value {}", name, val),
                None => format!("setoption name {}", name),
            },
            Self::Position { start, moves } => {
                let mut cmd = format!("position {}", start.to_uci());
                if !moves.is_empty() {
                    cmd.push_str(" moves");
                    for mv in moves {
                        cmd.push(' ');
                        cmd.push_str(mv);
                    }
                }
                cmd
            }
            Self::Go(params) => params.to_uci(),
            Self::Quit => "quit".to_string(),
        }
    }
}

/// Parameters for the "go" command
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub movetime: Option<u64>, // Move time in milliseconds
    pub depth: Option<u8>,     // Search depth
    pub infinite: bool,        // Search until "stop"
}

impl GoParams {
    pub fn movetime(ms: u64) -> Self {
        Self {
            movetime: Some(ms),
            ..Default::default()
        }
    }

    fn to_uci(&self) -> String {
        if let Some(movetime) = self.movetime {
            format!("go movetime {}", movetime)
        } else if let Some(depth) = self.depth {
            format!("go depth {}", depth)
        } else if self.infinite {
            "go infinite".to_string()
        } else {
            "go movetime 1000".to_string()
        }
    }
}

/// One parsed `info` line.
///
/// The score is relative to the side to move and limited to
/// `±MAX_ENGINE_SCORE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    /// `Some(0)` when the `multipv` value is not a valid index.
    pub multipv: Option<u32>,
    pub score: Option<AnalysisScore>,
    pub bound: ScoreBound,
    pub time_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub hashfull: Option<u16>,
    pub currmove: Option<CompactMove>,
    /// Set when the line carried a `pv` token, even an empty one.
    pub has_pv: bool,
    pub pv: SmallVec<[CompactMove; MAX_PV_MOVES]>,
    pub string: Option<String>,
}
