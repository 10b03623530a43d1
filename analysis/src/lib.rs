//! Move-quality analysis of a played game with a UCI engine.
//!
//! [`AnalysisJob`] drives one engine process through every ply of a game and
//! produces a shared [`AnalysisResult`]: per-ply evaluations normalized to
//! White's point of view, centipawn loss, best-move rank, a quality label and
//! per-side summaries.

pub mod config;
pub mod critical;
pub mod job;
pub mod metrics;
pub mod parser;
pub mod result;
pub mod types;

pub use config::AnalysisConfig;
pub use critical::{is_critical_ply, mark_critical};
pub use job::{AnalysisJob, AnalysisRequest, CancelHandle, JobError};
pub use parser::apply_uci_line;
pub use result::{compute_accuracy, AnalysisResult, PlayerStats, SharedAnalysis};
pub use types::{MoveLabel, PlyRecord, VariationLine, MAX_MULTIPV};

pub use chess::{AnalysisScore, Side, StartPosition};
