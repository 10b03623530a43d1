//! chessreview - move-quality review of a chess game with a UCI engine.
//!
//! Runs one analysis job over the given moves and prints a per-ply table
//! followed by a summary for each side, or the full result as JSON.
//! Configuration defaults come from `CHESSREVIEW_*` environment variables;
//! command-line flags override them. Logs go to stderr (`RUST_LOG`).

mod moves;
mod report;

use std::path::PathBuf;

use analysis::{AnalysisConfig, AnalysisJob, AnalysisRequest, StartPosition};
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(name = "chessreview", about = "Engine review of a played chess game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse every move of a game.
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Moves in UCI notation (e2e4 e7e5 ...).
    moves: Vec<String>,

    /// Read moves from a file (whitespace separated, after any positional moves).
    #[arg(long, value_name = "FILE")]
    moves_file: Option<PathBuf>,

    /// Start position; the standard start when omitted.
    #[arg(long)]
    fen: Option<String>,

    /// Engine executable.
    #[arg(long, value_name = "PATH")]
    engine: Option<PathBuf>,

    /// Principal variations per position (1-5).
    #[arg(long)]
    multipv: Option<usize>,

    #[arg(long)]
    threads: Option<u32>,

    /// Engine hash size in MB.
    #[arg(long)]
    hash: Option<u32>,

    /// First-pass search time per ply in milliseconds.
    #[arg(long, value_name = "MS")]
    movetime: Option<u64>,

    /// Re-search critical plies with a longer time.
    #[arg(long)]
    pass2: bool,

    /// Second-pass search time per critical ply in milliseconds.
    #[arg(long, value_name = "MS")]
    pass2_movetime: Option<u64>,

    /// Print the full result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl AnalyzeArgs {
    /// Flags set on the command line win over `base`.
    fn config(&self, base: AnalysisConfig) -> AnalysisConfig {
        AnalysisConfig {
            engine_path: self.engine.clone().unwrap_or(base.engine_path),
            multipv: self.multipv.unwrap_or(base.multipv),
            threads: self.threads.unwrap_or(base.threads),
            hash_mb: self.hash.unwrap_or(base.hash_mb),
            pass1_movetime_ms: self.movetime.unwrap_or(base.pass1_movetime_ms),
            pass2_movetime_ms: self.pass2_movetime.unwrap_or(base.pass2_movetime_ms),
            enable_pass2: self.pass2 || base.enable_pass2,
            handshake_timeout: base.handshake_timeout,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args).await,
    }
}

async fn run_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let moves = moves::collect(&args.moves, args.moves_file.as_deref())?;
    let config = args.config(AnalysisConfig::from_env());
    let request = AnalysisRequest::new(StartPosition::from_optional(args.fen.as_deref()), moves);

    tracing::info!(plies = request.moves.len(), "Reviewing game");

    let (tx, rx) = oneshot::channel();
    let job = AnalysisJob::start(
        request,
        config,
        |done, total| tracing::info!("Analysed ply {}/{}", done, total),
        move |result| {
            let _ = tx.send(result);
        },
    );

    let cancel = job.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling analysis");
            cancel.cancel();
        }
    });

    job.join().await;
    let result = rx
        .await
        .context("analysis worker stopped without reporting")?
        .ok_or_else(|| anyhow!("analysis produced no result"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*result)?);
    } else {
        print!("{}", report::render(&result));
    }
    Ok(())
}
