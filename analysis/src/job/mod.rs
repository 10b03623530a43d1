//! Background analysis jobs.
//!
//! A job owns one engine for its whole life: it performs the UCI handshake,
//! searches every ply of the game in order, optionally re-searches the
//! critical plies, and hands the finished [`AnalysisResult`] to the caller.
//! Callbacks run on the worker task, not on the caller's task.

mod worker;

use crate::config::AnalysisConfig;
use crate::result::{AnalysisResult, SharedAnalysis};
use chess::{FenError, StartPosition};
use engine::{EngineProcess, EngineTransport, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Game to analyse: a start position and the moves played from it, in UCI
/// notation. Legality is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub start: StartPosition,
    pub moves: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(start: StartPosition, moves: Vec<String>) -> Self {
        Self { start, moves }
    }

    /// Moves played from the standard start position.
    pub fn from_startpos<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start: StartPosition::Standard,
            moves: moves.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    Spawn(TransportError),
    #[error("Engine transport error: {0}")]
    Transport(TransportError),
    #[error("Engine closed its output stream")]
    StreamClosed,
    #[error("Engine did not complete the UCI handshake within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("Invalid start position: {0}")]
    InvalidStartPosition(#[from] FenError),
    #[error("Analysis cancelled")]
    Cancelled,
}

impl From<TransportError> for JobError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::EndOfStream => Self::StreamClosed,
            TransportError::Spawn { .. } => Self::Spawn(err),
            other => Self::Transport(other),
        }
    }
}

/// Cooperative cancel flag shared between a job and its controllers.
///
/// Setting it interrupts a pending engine read; otherwise it is observed at
/// the start of the next ply.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        // send_replace succeeds even with no live receiver.
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Handle to a running analysis.
///
/// Dropping the handle detaches the worker: it runs to completion (or to the
/// next cancellation checkpoint) and still calls `on_complete`.
pub struct AnalysisJob {
    cancel: CancelHandle,
    handle: JoinHandle<()>,
}

impl AnalysisJob {
    /// Spawn the configured engine and analyse `request` on a new task.
    ///
    /// `on_progress(done, total)` fires after every first-pass ply.
    /// `on_complete` fires exactly once, with `None` when the job failed or
    /// was cancelled. Must be called from within a Tokio runtime.
    pub fn start<P, C>(
        request: AnalysisRequest,
        config: AnalysisConfig,
        on_progress: P,
        on_complete: C,
    ) -> Self
    where
        P: FnMut(usize, usize) + Send + 'static,
        C: FnOnce(Option<SharedAnalysis>) + Send + 'static,
    {
        let path = config.engine_path.to_string_lossy().into_owned();
        Self::spawn_worker(
            async move { EngineProcess::spawn(&path).await },
            request,
            config,
            on_progress,
            on_complete,
        )
    }

    /// Like [`AnalysisJob::start`], over an already connected engine.
    pub fn start_with_transport<T, P, C>(
        transport: T,
        request: AnalysisRequest,
        config: AnalysisConfig,
        on_progress: P,
        on_complete: C,
    ) -> Self
    where
        T: EngineTransport + 'static,
        P: FnMut(usize, usize) + Send + 'static,
        C: FnOnce(Option<SharedAnalysis>) + Send + 'static,
    {
        Self::spawn_worker(
            async move { Ok(transport) },
            request,
            config,
            on_progress,
            on_complete,
        )
    }

    fn spawn_worker<T, F, P, C>(
        connect: F,
        request: AnalysisRequest,
        config: AnalysisConfig,
        mut on_progress: P,
        on_complete: C,
    ) -> Self
    where
        T: EngineTransport + 'static,
        F: std::future::Future<Output = Result<T, TransportError>> + Send + 'static,
        P: FnMut(usize, usize) + Send + 'static,
        C: FnOnce(Option<SharedAnalysis>) + Send + 'static,
    {
        let cancel = CancelHandle::new();
        let worker_cancel = cancel.clone();
        let config = config.normalized();

        let handle = tokio::spawn(async move {
            tracing::info!(
                plies = request.moves.len(),
                multipv = config.multipv,
                movetime_ms = config.pass1_movetime_ms,
                pass2 = config.runs_pass2(),
                engine = %config.engine_path.display(),
                "Starting analysis job"
            );

            let outcome =
                worker::execute(connect, request, config, worker_cancel, &mut on_progress).await;
            on_complete(finish(outcome));
        });

        Self { cancel, handle }
    }

    pub fn cancel(&self) {
        tracing::debug!("Analysis cancel requested");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel flag usable after the job handle is moved or dropped.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether the worker has returned (after `on_complete`).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker to return.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::error!("Analysis worker panicked: {}", e);
        }
    }
}

fn finish(outcome: Result<AnalysisResult, JobError>) -> Option<SharedAnalysis> {
    match outcome {
        Ok(result) => {
            tracing::info!(
                plies = result.total_plies,
                white_acpl = result.white_acpl(),
                black_acpl = result.black_acpl(),
                "Analysis complete"
            );
            Some(result.into_shared())
        }
        Err(JobError::Cancelled) => {
            tracing::info!("Analysis cancelled");
            None
        }
        Err(e) => {
            tracing::error!("Analysis failed: {}", e);
            None
        }
    }
}
