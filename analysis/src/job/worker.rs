use super::{CancelHandle, JobError};
use crate::config::AnalysisConfig;
use crate::critical::mark_critical;
use crate::job::AnalysisRequest;
use crate::parser::apply_uci_line;
use crate::result::AnalysisResult;
use crate::types::PlyRecord;
use chess::Side;
use engine::{
    is_bestmove_line, parse_uci_message, EngineCommand, EngineTransport, GoParams, TransportError,
    UciMessage,
};
use std::future::Future;
use tokio::sync::watch;

/// Run one job to completion: connect, analyse, release the engine.
pub(super) async fn execute<T, F, P>(
    connect: F,
    request: AnalysisRequest,
    config: AnalysisConfig,
    cancel: CancelHandle,
    on_progress: &mut P,
) -> Result<AnalysisResult, JobError>
where
    T: EngineTransport,
    F: Future<Output = Result<T, TransportError>>,
    P: FnMut(usize, usize),
{
    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }
    let first_mover = request.start.side_to_move()?;
    let engine = connect.await?;

    let mut worker = Worker {
        engine,
        cancel_rx: cancel.subscribe(),
        _cancel: cancel,
        request,
        config,
        engine_name: None,
    };

    let outcome = worker.analyze(first_mover, on_progress).await;
    tracing::debug!("Shutting down engine");
    worker.engine.shutdown().await;
    outcome
}

struct Worker<T> {
    engine: T,
    cancel_rx: watch::Receiver<bool>,
    /// Keeps the sender alive so the receiver never reports a closed channel.
    _cancel: CancelHandle,
    request: AnalysisRequest,
    config: AnalysisConfig,
    engine_name: Option<String>,
}

impl<T: EngineTransport> Worker<T> {
    async fn analyze<P>(
        &mut self,
        first_mover: Side,
        on_progress: &mut P,
    ) -> Result<AnalysisResult, JobError>
    where
        P: FnMut(usize, usize),
    {
        self.handshake().await?;

        let total = self.request.moves.len();
        let movetime = self.config.pass1_movetime_ms;
        let mut plies = Vec::with_capacity(total);

        for index in 0..total {
            self.check_cancelled()?;
            let record = self
                .search_ply(index, Side::for_ply(first_mover, index), movetime)
                .await?;

            tracing::debug!(
                ply = index + 1,
                total,
                side = %record.side_to_move,
                played = %record.played_move,
                eval = record.eval_white,
                depth = record.primary_depth,
                rank = record.best_move_rank,
                cp_loss = record.centipawn_loss,
                label = %record.label,
                "Ply analyzed"
            );

            plies.push(record);
            on_progress(index + 1, total);
        }

        let critical = mark_critical(&mut plies);
        if self.config.runs_pass2() && critical > 0 {
            self.refine(&mut plies).await?;
        }

        self.check_cancelled()?;
        Ok(AnalysisResult::finalize(
            self.request.start.clone(),
            self.engine_name.take(),
            plies,
        ))
    }

    /// `uci` until `uciok`, engine options, then `isready` until `readyok`.
    async fn handshake(&mut self) -> Result<(), JobError> {
        let limit = self.config.handshake_timeout;
        match tokio::time::timeout(limit, self.handshake_exchange()).await {
            Ok(result) => result,
            Err(_) => Err(JobError::HandshakeTimeout(limit)),
        }
    }

    async fn handshake_exchange(&mut self) -> Result<(), JobError> {
        self.send(EngineCommand::Uci).await?;
        loop {
            let line = self.next_line().await?;
            match parse_uci_message(&line) {
                Ok(UciMessage::Id { name, value }) if name == "name" => {
                    self.engine_name = Some(value);
                }
                Ok(UciMessage::UciOk) => break,
                _ => {}
            }
        }

        self.send(EngineCommand::set_option("MultiPV", self.config.multipv))
            .await?;
        self.send(EngineCommand::set_option("Hash", self.config.hash_mb))
            .await?;
        self.send(EngineCommand::set_option("Threads", self.config.threads))
            .await?;
        self.send(EngineCommand::IsReady).await?;
        while !self.next_line().await?.contains("readyok") {}

        tracing::info!(
            engine = self.engine_name.as_deref().unwrap_or("unknown"),
            "Engine ready"
        );
        Ok(())
    }

    /// Search the position before ply `index` and score the played move.
    async fn search_ply(
        &mut self,
        index: usize,
        side: Side,
        movetime_ms: u64,
    ) -> Result<PlyRecord, JobError> {
        let mut record = PlyRecord::new(index, side, self.request.moves[index].clone());
        record.movetime_ms = movetime_ms;

        self.send(EngineCommand::Position {
            start: self.request.start.clone(),
            moves: self.request.moves[..index].to_vec(),
        })
        .await?;
        self.send(EngineCommand::Go(GoParams::movetime(movetime_ms)))
            .await?;

        loop {
            let line = self.next_line().await?;
            if is_bestmove_line(&line) {
                break;
            }
            apply_uci_line(&mut record, &line, self.config.multipv);
        }

        record.normalize_perspective();
        record.score_played_move();
        Ok(record)
    }

    /// Second pass: re-search critical plies with the longer movetime.
    async fn refine(&mut self, plies: &mut [PlyRecord]) -> Result<(), JobError> {
        let movetime = self.config.pass2_movetime_ms;
        tracing::info!(
            critical = plies.iter().filter(|p| p.is_critical).count(),
            movetime_ms = movetime,
            "Refining critical plies"
        );

        for ply in plies.iter_mut().filter(|p| p.is_critical) {
            self.check_cancelled()?;
            let mut refined = self
                .search_ply(ply.ply_index, ply.side_to_move, movetime)
                .await?;
            refined.is_critical = true;

            tracing::debug!(
                ply = ply.ply_index + 1,
                cp_loss_before = ply.centipawn_loss,
                cp_loss = refined.centipawn_loss,
                label = %refined.label,
                "Ply refined"
            );
            *ply = refined;
        }
        Ok(())
    }

    async fn send(&mut self, cmd: EngineCommand) -> Result<(), JobError> {
        self.engine.send_command(&cmd).await?;
        Ok(())
    }

    /// Next engine line, or `Cancelled` as soon as the flag is set.
    async fn next_line(&mut self) -> Result<String, JobError> {
        tokio::select! {
            biased;
            _ = wait_cancelled(&mut self.cancel_rx) => Err(JobError::Cancelled),
            line = self.engine.read_line() => Ok(line?),
        }
    }

    fn check_cancelled(&self) -> Result<(), JobError> {
        if *self.cancel_rx.borrow() {
            return Err(JobError::Cancelled);
        }
        Ok(())
    }
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
