//! End-to-end runs against a shell script posing as a UCI engine.
#![cfg(unix)]

use analysis::{
    AnalysisConfig, AnalysisJob, AnalysisRequest, MoveLabel, SharedAnalysis, Side,
};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

const FAKE_ENGINE: &str = r#"
n=0
while read -r line; do
  case "$line" in
    uci)
      echo "id name FakeFish 1.0"
      echo "option name Hash type spin default 16 min 1 max 33554432"
      printf 'uciok\r\n' ;;
    isready) echo "readyok" ;;
    go*)
      n=$((n+1))
      if [ "$n" = 1 ]; then
        echo "info depth 12 multipv 1 score cp 25 pv e2e4 e7e5"
        echo "info depth 12 multipv 2 score cp 10 pv d2d4 d7d5"
        echo "bestmove e2e4 ponder e7e5"
      else
        echo "info string NNUE evaluation enabled"
        echo "info depth 14 multipv 1 score cp -30 pv c7c5 g1f3"
        echo "info depth 9 multipv 1 score cp 500 pv a7a6"
        echo "info depth 14 multipv 2 score cp -60 pv e7e5 g1f3"
        echo "bestmove c7c5"
      fi ;;
    quit) exit 0 ;;
  esac
done
"#;

const CRASHING_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*)
      echo "info depth 1 score cp 3 pv e2e4"
      exit 1 ;;
  esac
done
"#;

fn engine_script(body: &str) -> tempfile::TempPath {
    let mut file = tempfile::Builder::new()
        .prefix("fake-engine-")
        .suffix(".sh")
        .tempfile()
        .unwrap();
    writeln!(file, "#!/bin/sh").unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file.flush().unwrap();
    let path = file.into_temp_path();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

async fn analyze(
    engine: &tempfile::TempPath,
    moves: &[&str],
    multipv: usize,
) -> (Option<SharedAnalysis>, Vec<(usize, usize)>) {
    let config = AnalysisConfig {
        engine_path: engine.to_path_buf(),
        multipv,
        pass1_movetime_ms: 50,
        handshake_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let progress = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&progress);
    let (tx, rx) = oneshot::channel();

    let job = AnalysisJob::start(
        AnalysisRequest::from_startpos(moves.iter().copied()),
        config,
        move |done, total| seen.lock().unwrap().push((done, total)),
        move |result| {
            let _ = tx.send(result);
        },
    );
    job.join().await;

    let result = rx.await.unwrap();
    let progress = progress.lock().unwrap().clone();
    (result, progress)
}

#[tokio::test]
async fn analyses_game_with_subprocess_engine() {
    let engine = engine_script(FAKE_ENGINE);
    let (result, progress) = analyze(&engine, &["e2e4", "e7e5"], 2).await;
    let result = result.expect("analysis result");

    assert_eq!(progress, vec![(1, 2), (2, 2)]);
    assert_eq!(result.engine_name.as_deref(), Some("FakeFish 1.0"));
    assert_eq!(result.total_plies, 2);

    let white = &result.plies[0];
    assert_eq!(white.side_to_move, Side::White);
    assert_eq!(white.best_move_rank, 1);
    assert_eq!(white.label, MoveLabel::Best);
    assert_eq!(white.eval_white, 25);

    let black = &result.plies[1];
    assert_eq!(black.side_to_move, Side::Black);
    assert_eq!(black.primary_depth, 14);
    assert_eq!(black.eval_white, 30);
    assert_eq!(black.best_move_rank, 2);
    assert_eq!(black.centipawn_loss, 30);
    assert_eq!(black.label, MoveLabel::Good);

    assert_eq!(result.white_acpl(), 0.0);
    assert_eq!(result.black_acpl(), 30.0);
}

#[tokio::test]
async fn engine_exit_mid_search_yields_no_result() {
    let engine = engine_script(CRASHING_ENGINE);
    let (result, progress) = analyze(&engine, &["e2e4"], 1).await;

    assert!(result.is_none());
    assert!(progress.is_empty());
}

#[tokio::test]
async fn missing_engine_yields_no_result() {
    let config = AnalysisConfig {
        engine_path: "/nonexistent/engines/stockfish".into(),
        ..Default::default()
    };
    let (tx, rx) = oneshot::channel();
    let job = AnalysisJob::start(
        AnalysisRequest::from_startpos(["e2e4"]),
        config,
        |_, _| panic!("no progress without an engine"),
        move |result| {
            let _ = tx.send(result);
        },
    );
    job.join().await;
    assert!(rx.await.unwrap().is_none());
}
