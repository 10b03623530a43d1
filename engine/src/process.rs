use crate::EngineCommand;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};

/// Longest line returned by a single [`EngineTransport::read_line`] call.
/// Longer output is returned in pieces on subsequent calls.
pub const MAX_LINE_BYTES: usize = 4096;

/// How long [`EngineProcess`] waits for the engine to exit after `quit`.
const QUIT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to spawn engine {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Engine has no stdin")]
    NoStdin,
    #[error("Engine has no stdout")]
    NoStdout,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine closed its output stream")]
    EndOfStream,
}

/// Line-oriented channel to a UCI engine.
#[async_trait]
pub trait EngineTransport: Send {
    /// Write one line; the newline is appended here.
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Next output line without its terminator or carriage returns.
    ///
    /// Returns [`TransportError::EndOfStream`] once the engine closes its
    /// output. Cancel-safe: bytes read before the future is dropped are kept
    /// for the next call.
    async fn read_line(&mut self) -> Result<String, TransportError>;

    /// Send `quit` and release the engine.
    async fn shutdown(&mut self);

    async fn send_command(&mut self, cmd: &EngineCommand) -> Result<(), TransportError> {
        self.send_line(&cmd.to_uci()).await
    }
}

/// An engine subprocess speaking UCI over its standard streams.
pub struct EngineProcess {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    pending: Vec<u8>,
}

impl EngineProcess {
    /// Spawn the engine at `path` with piped stdin/stdout.
    #[tracing::instrument(level = "info")]
    pub async fn spawn(path: &str) -> Result<Self, TransportError> {
        let path = locate_engine(path);
        tracing::info!("Spawning engine process: {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn engine {:?}: {}", path, e);
                TransportError::Spawn {
                    path: path.display().to_string(),
                    source: e,
                }
            })?;

        let stdin = process.stdin.take().ok_or(TransportError::NoStdin)?;
        let stdout = process.stdout.take().ok_or(TransportError::NoStdout)?;
        tracing::debug!(pid = ?process.id(), "Engine process spawned");

        Ok(Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            pending: Vec::with_capacity(256),
        })
    }
}

#[async_trait]
impl EngineTransport for EngineProcess {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        tracing::trace!("UCI >> {}", line);
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, TransportError> {
        let limit = MAX_LINE_BYTES.saturating_sub(self.pending.len()) as u64;
        let read = (&mut self.stdout)
            .take(limit)
            .read_until(b'\n', &mut self.pending)
            .await?;

        if read == 0 && self.pending.is_empty() {
            tracing::warn!("Engine stdout EOF - engine closed");
            return Err(TransportError::EndOfStream);
        }

        let mut bytes = std::mem::take(&mut self.pending);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        bytes.retain(|&b| b != b'\r');

        let line = String::from_utf8_lossy(&bytes).into_owned();
        tracing::trace!("UCI << {}", line);
        Ok(line)
    }

    async fn shutdown(&mut self) {
        tracing::debug!("Sending quit command to engine");
        let _ = self.send_command(&EngineCommand::Quit).await;
        match tokio::time::timeout(QUIT_GRACE, self.process.wait()).await {
            Ok(Ok(status)) => tracing::debug!("Engine exited with {}", status),
            _ => {
                tracing::warn!("Engine did not exit after quit, killing it");
                let _ = self.process.kill().await;
            }
        }
    }
}

/// Resolve a bare engine name against common install locations.
///
/// Paths containing a separator are returned unchanged. A bare name is
/// looked up in the usual system directories (Debian puts Stockfish in
/// `/usr/games`, which is often not on `PATH`) and otherwise left for the
/// `PATH` lookup done by the OS.
pub fn locate_engine(name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.components().count() != 1 || name.is_empty() {
        return path.to_path_buf();
    }

    let dirs = [
        "/usr/local/bin",
        "/usr/bin",
        "/opt/homebrew/bin",
        "/usr/games",
    ];

    for dir in dirs {
        let candidate = Path::new(dir).join(name);
        if candidate.is_file() {
            return candidate;
        }
    }

    path.to_path_buf()
}
