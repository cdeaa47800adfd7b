//! Connection Handler Module
//!
//! This module handles individual client sessions. Each client gets its own
//! handler task that runs in a loop, reading one framed statement at a time,
//! executing it, and writing the framed response.
//!
//! ## Session Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned               CONNECTED
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read until NUL          │ │        RECEIVING
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Execute statement       │ │        EXECUTING
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Send response + NUL     │ │        SENDING
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. EOF / empty message / I/O error / idle timeout
//!        │
//!        ▼
//! 5. Handler consumed, socket dropped        CLOSED
//! ```
//!
//! Statements on one session run strictly in order: the next frame is not
//! looked at until the previous response has been flushed.

use crate::executor::StatementExecutor;
use crate::protocol::{FrameBuffer, FrameError, Response, DEFAULT_MAX_FRAME_SIZE};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Per-session limits.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Largest request accepted before the session is dropped
    pub max_frame_size: usize,
    /// Close the session if no bytes arrive for this long
    pub idle_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            idle_timeout: None,
        }
    }
}

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total statements executed
    pub statements_processed: AtomicU64,
    /// Statements answered with `SQL Error: ...`
    pub statement_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn statement_processed(&self, response: &Response) {
        self.statements_processed.fetch_add(1, Ordering::Relaxed);
        if response.is_error() {
            self.statement_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client session.
///
/// Owns the stream for the whole session; dropping the handler closes it.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Incoming bytes not yet returned as a frame
    frames: FrameBuffer,

    /// Shared statement executor
    executor: StatementExecutor,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,

    idle_timeout: Option<Duration>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream
    /// * `addr` - The client's socket address
    /// * `executor` - The executor shared by all sessions
    /// * `stats` - Shared connection statistics
    /// * `config` - Per-session limits
    pub fn new(
        stream: S,
        addr: SocketAddr,
        executor: StatementExecutor,
        stats: Arc<ConnectionStats>,
        config: &ConnectionConfig,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            frames: FrameBuffer::new(config.max_frame_size),
            executor,
            stats,
            idle_timeout: config.idle_timeout,
        }
    }

    /// Runs the session until the client leaves or the stream fails.
    ///
    /// Consumes the handler, so the stream is released exactly once on every path.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The receive-execute-send loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let message = match self.receive().await? {
                Some(message) => message,
                None => return Ok(()),
            };

            if message.is_empty() {
                debug!(client = %self.addr, "Empty message, closing session");
                return Ok(());
            }

            debug!(client = %self.addr, statement = %message, "Received statement");
            let response = self.executor.execute_async(message).await;
            self.stats.statement_processed(&response);

            self.send_response(&response).await?;
        }
    }

    /// Reads until one complete frame is buffered.
    ///
    /// Returns `None` when the client closes the stream. Bytes of an
    /// unterminated frame at end of stream are discarded.
    pub async fn receive(&mut self) -> Result<Option<String>, ConnectionError> {
        loop {
            if let Some(message) = self.frames.next_frame()? {
                return Ok(Some(message));
            }

            if self.read_more_data().await? == 0 {
                if !self.frames.is_empty() {
                    debug!(
                        client = %self.addr,
                        discarded = self.frames.len(),
                        "Stream ended inside a message"
                    );
                    self.frames.clear();
                }
                return Ok(None);
            }
        }
    }

    /// Reads more data from the stream into the frame buffer.
    async fn read_more_data(&mut self) -> Result<usize, ConnectionError> {
        let read = self.stream.get_mut().read_buf(self.frames.buffer_mut());
        let n = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| ConnectionError::IdleTimeout(limit))??,
            None => read.await?,
        };

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");
        Ok(n)
    }

    /// Sends a framed response to the client.
    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Frame assembly error
    #[error("Frame error: {0}")]
    FrameError(#[from] FrameError),

    /// Raised by `GatewayClient` when the server closes the stream before
    /// a response arrives; the server-side session treats end of stream as
    /// a normal close instead
    #[error("Client disconnected")]
    ClientDisconnected,

    /// No data arrived within the idle timeout
    #[error("Idle for more than {0:?}")]
    IdleTimeout(Duration),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it, logging any error instead of returning it.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    executor: StatementExecutor,
    stats: Arc<ConnectionStats>,
    config: ConnectionConfig,
) {
    let handler = ConnectionHandler::new(stream, addr, executor, stats, &config);
    if let Err(e) = handler.run().await {
        debug!(client = %addr, error = %e, "Connection ended with error");
    }
}
