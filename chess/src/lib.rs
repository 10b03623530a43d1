pub mod analysis;
pub mod fen;
pub mod uci;

pub use analysis::{AnalysisScore, ScoreBound, Side, MATE_SCORE, MAX_ENGINE_SCORE};
pub use fen::{FenError, StartPosition};
pub use uci::{CompactMove, Promotion};
