//! Tunables for one analysis job.
//!
//! Every value has a default and can be overridden from the environment via
//! [`AnalysisConfig::from_env`]. Engine option values are clamped by
//! [`AnalysisConfig::normalized`] before they reach the engine.

use crate::types::MAX_MULTIPV;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default engine executable, resolved against common install locations.
const DEFAULT_ENGINE_PATH: &str = "stockfish";

const DEFAULT_MULTIPV: usize = 3;
const DEFAULT_THREADS: u32 = 1;
const DEFAULT_HASH_MB: u32 = 64;
const DEFAULT_PASS1_MOVETIME_MS: u64 = 1000;
const DEFAULT_PASS2_MOVETIME_MS: u64 = 3000;
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_THREADS: u32 = 16;
const MAX_HASH_MB: u32 = 2048;

/// Configuration copied into a job when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of principal variations requested (`MultiPV`).
    pub multipv: usize,
    /// Engine search threads (`Threads`).
    pub threads: u32,
    /// Engine hash table size in MB (`Hash`).
    pub hash_mb: u32,
    pub pass1_movetime_ms: u64,
    pub pass2_movetime_ms: u64,
    /// Re-search critical plies with `pass2_movetime_ms`.
    pub enable_pass2: bool,
    pub engine_path: PathBuf,
    /// Longest wait for `uciok` plus `readyok`.
    pub handshake_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            multipv: DEFAULT_MULTIPV,
            threads: DEFAULT_THREADS,
            hash_mb: DEFAULT_HASH_MB,
            pass1_movetime_ms: DEFAULT_PASS1_MOVETIME_MS,
            pass2_movetime_ms: DEFAULT_PASS2_MOVETIME_MS,
            enable_pass2: false,
            engine_path: PathBuf::from(DEFAULT_ENGINE_PATH),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Priority per field:
    /// 1. `CHESSREVIEW_*` env variable if set and parseable
    /// 2. the default
    ///
    /// Recognized: `CHESSREVIEW_ENGINE_PATH`, `CHESSREVIEW_MULTIPV`,
    /// `CHESSREVIEW_THREADS`, `CHESSREVIEW_HASH_MB`, `CHESSREVIEW_MOVETIME_MS`,
    /// `CHESSREVIEW_PASS2_MOVETIME_MS`, `CHESSREVIEW_PASS2`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            multipv: parsed(&lookup, "CHESSREVIEW_MULTIPV").unwrap_or(defaults.multipv),
            threads: parsed(&lookup, "CHESSREVIEW_THREADS").unwrap_or(defaults.threads),
            hash_mb: parsed(&lookup, "CHESSREVIEW_HASH_MB").unwrap_or(defaults.hash_mb),
            pass1_movetime_ms: parsed(&lookup, "CHESSREVIEW_MOVETIME_MS")
                .unwrap_or(defaults.pass1_movetime_ms),
            pass2_movetime_ms: parsed(&lookup, "CHESSREVIEW_PASS2_MOVETIME_MS")
                .unwrap_or(defaults.pass2_movetime_ms),
            enable_pass2: lookup("CHESSREVIEW_PASS2")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.enable_pass2),
            engine_path: lookup("CHESSREVIEW_ENGINE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.engine_path),
            handshake_timeout: defaults.handshake_timeout,
        }
    }

    /// Copy with engine options clamped to the ranges engines accept.
    pub fn normalized(&self) -> Self {
        Self {
            multipv: self.multipv.clamp(1, MAX_MULTIPV),
            threads: self.threads.clamp(1, MAX_THREADS),
            hash_mb: self.hash_mb.clamp(1, MAX_HASH_MB),
            ..self.clone()
        }
    }

    /// Whether critical plies get a second, longer search.
    pub fn runs_pass2(&self) -> bool {
        self.enable_pass2 && self.pass2_movetime_ms > 0
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.multipv, 3);
        assert_eq!(config.threads, 1);
        assert_eq!(config.hash_mb, 64);
        assert_eq!(config.pass1_movetime_ms, 1000);
        assert!(!config.enable_pass2);
        assert!(!config.runs_pass2());
        assert_eq!(config.engine_path, PathBuf::from("stockfish"));
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides() {
        let config = AnalysisConfig::from_lookup(lookup(&[
            ("CHESSREVIEW_ENGINE_PATH", "/opt/sf/stockfish"),
            ("CHESSREVIEW_MULTIPV", "5"),
            ("CHESSREVIEW_THREADS", "4"),
            ("CHESSREVIEW_HASH_MB", "256"),
            ("CHESSREVIEW_MOVETIME_MS", "250"),
            ("CHESSREVIEW_PASS2_MOVETIME_MS", "900"),
            ("CHESSREVIEW_PASS2", "true"),
        ]));
        assert_eq!(config.engine_path, PathBuf::from("/opt/sf/stockfish"));
        assert_eq!(config.multipv, 5);
        assert_eq!(config.threads, 4);
        assert_eq!(config.hash_mb, 256);
        assert_eq!(config.pass1_movetime_ms, 250);
        assert_eq!(config.pass2_movetime_ms, 900);
        assert!(config.runs_pass2());
    }

    #[test]
    fn test_unparseable_env_falls_back_to_default() {
        let config = AnalysisConfig::from_lookup(lookup(&[
            ("CHESSREVIEW_MULTIPV", "lots"),
            ("CHESSREVIEW_THREADS", "-3"),
            ("CHESSREVIEW_HASH_MB", "1.5"),
            ("CHESSREVIEW_MOVETIME_MS", "soon"),
            ("CHESSREVIEW_PASS2_MOVETIME_MS", ""),
            ("CHESSREVIEW_PASS2", "maybe"),
            ("CHESSREVIEW_ENGINE_PATH", ""),
        ]));
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_normalized_clamps_engine_options() {
        let config = AnalysisConfig {
            multipv: 12,
            threads: 0,
            hash_mb: 100_000,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.multipv, MAX_MULTIPV);
        assert_eq!(config.threads, 1);
        assert_eq!(config.hash_mb, MAX_HASH_MB);

        let low = AnalysisConfig {
            multipv: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(low.multipv, 1);
    }

    #[test]
    fn test_pass2_needs_movetime() {
        let config = AnalysisConfig {
            enable_pass2: true,
            pass2_movetime_ms: 0,
            ..Default::default()
        };
        assert!(!config.runs_pass2());
    }
}
