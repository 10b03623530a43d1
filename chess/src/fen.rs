use cozy_chess::Board;
use serde::{Deserialize, Serialize};

use crate::analysis::Side;

/// Position the analysed game starts from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartPosition {
    #[default]
    Standard,
    Fen(String),
}

impl StartPosition {
    /// Empty or missing FEN text means the standard start.
    pub fn from_optional(fen: Option<&str>) -> Self {
        match fen.map(str::trim) {
            Some(f) if !f.is_empty() => Self::Fen(f.to_string()),
            _ => Self::Standard,
        }
    }

    /// Side to move in the start position.
    pub fn side_to_move(&self) -> Result<Side, FenError> {
        match self {
            Self::Standard => Ok(Side::White),
            Self::Fen(fen) => Ok(parse_fen(fen)?.side_to_move().into()),
        }
    }

    /// UCI `position` argument for this start, without any moves.
    pub fn to_uci(&self) -> String {
        match self {
            Self::Standard => "startpos".to_string(),
            Self::Fen(fen) => format!("fen {}", fen),
        }
    }
}

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    if fen.split_whitespace().next().is_none() {
        return Err(FenError::InvalidFormat);
    }
    fen.parse().map_err(|_| FenError::InvalidFormat)
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
}
