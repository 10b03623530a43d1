use std::path::Path;

use chess::CompactMove;

#[derive(Debug, thiserror::Error)]
pub enum MovesError {
    #[error("failed to read moves file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("not a UCI move: {0}")]
    InvalidMove(String),
    #[error("no moves to analyse")]
    Empty,
}

/// Positional moves followed by the contents of `file`, checked for UCI
/// syntax only.
pub fn collect(positional: &[String], file: Option<&Path>) -> Result<Vec<String>, MovesError> {
    let mut moves = positional.to_vec();

    if let Some(path) = file {
        let text = std::fs::read_to_string(path).map_err(|source| MovesError::Read {
            path: path.display().to_string(),
            source,
        })?;
        moves.extend(text.split_whitespace().map(str::to_string));
    }

    if moves.is_empty() {
        return Err(MovesError::Empty);
    }
    if let Some(bad) = moves.iter().find(|m| CompactMove::from_uci(m).is_none()) {
        return Err(MovesError::InvalidMove(bad.clone()));
    }
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_positional_only() {
        let moves = collect(&["e2e4".to_string(), "e7e5".to_string()], None).unwrap();
        assert_eq!(moves, vec!["e2e4", "e7e5"]);
    }

    #[test]
    fn test_file_moves_follow_positional() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "e7e5 g1f3\n  b8c6\n").unwrap();

        let moves = collect(&["e2e4".to_string()], Some(file.path())).unwrap();
        assert_eq!(moves, vec!["e2e4", "e7e5", "g1f3", "b8c6"]);
    }

    #[test]
    fn test_rejects_non_uci_tokens() {
        let err = collect(&["e4".to_string()], None).unwrap_err();
        assert!(matches!(err, MovesError::InvalidMove(m) if m == "e4"));
    }

    #[test]
    fn test_empty_and_missing_file() {
        assert!(matches!(collect(&[], None), Err(MovesError::Empty)));
        assert!(matches!(
            collect(&[], Some(Path::new("/nonexistent/moves.txt"))),
            Err(MovesError::Read { .. })
        ));
    }
}
