//! Scripted engine for testing code that drives an [`EngineTransport`].

use crate::process::{EngineTransport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// What the mock does once it has nothing left to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenIdle {
    /// Report end of stream, like an engine that exited.
    Close,
    /// Block forever, like an engine stuck in a search.
    Hang,
}

/// A fake UCI engine that answers the handshake and replays one scripted
/// block of output per `go` command.
pub struct MockEngine {
    output: VecDeque<String>,
    searches: VecDeque<Vec<String>>,
    sent: Arc<Mutex<Vec<String>>>,
    handshake: bool,
    when_idle: WhenIdle,
    closed: bool,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            output: VecDeque::new(),
            searches: VecDeque::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            handshake: true,
            when_idle: WhenIdle::Close,
            closed: false,
        }
    }

    /// Queue the output for the next `go`. A `bestmove` line is not added
    /// automatically.
    pub fn with_search<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searches
            .push_back(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Never answer `uci` / `isready`.
    pub fn silent(mut self) -> Self {
        self.handshake = false;
        self
    }

    pub fn when_idle(mut self, when_idle: WhenIdle) -> Self {
        self.when_idle = when_idle;
        self
    }

    /// Shared log of every line written to the engine.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl EngineTransport for MockEngine {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(line.to_string());

        if line == "uci" && self.handshake {
            self.output.push_back("id name MockEngine".to_string());
            self.output.push_back("uciok".to_string());
        } else if line == "isready" && self.handshake {
            self.output.push_back("readyok".to_string());
        } else if line.starts_with("go") {
            if let Some(lines) = self.searches.pop_front() {
                self.output.extend(lines);
            }
        } else if line == "quit" {
            self.closed = true;
        }
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, TransportError> {
        if let Some(line) = self.output.pop_front() {
            return Ok(line);
        }
        if self.closed || self.when_idle == WhenIdle::Close {
            return Err(TransportError::EndOfStream);
        }
        std::future::pending().await
    }

    async fn shutdown(&mut self) {
        let _ = self.send_line("quit").await;
    }
}
