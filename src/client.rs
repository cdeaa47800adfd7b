//! Client side of the NUL-framed protocol.
//!
//! `GatewayClient` keeps one connection open and runs one statement per
//! `send`. Responses are returned as raw text: failures are not turned into
//! `Err`, callers check for the `SQL Error: ` prefix the same way any other
//! client would.
//!
//! ```no_run
//! use sqlgate::client::{escape_literal, GatewayClient};
//!
//! # async fn demo() -> Result<(), sqlgate::ConnectionError> {
//! let mut client = GatewayClient::connect("127.0.0.1:7778").await?;
//! let user = escape_literal("o'brien");
//! let password = client
//!     .send(&format!("SELECT password FROM Users WHERE username='{}'", user))
//!     .await?;
//! if password.starts_with("SQL Error: ") {
//!     eprintln!("lookup failed: {}", password);
//! }
//! # Ok(())
//! # }
//! ```

use crate::connection::ConnectionError;
use crate::protocol::{encode_frame, FrameBuffer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::trace;

/// A single connection to a gateway server.
pub struct GatewayClient {
    stream: TcpStream,
    frames: FrameBuffer,
}

impl GatewayClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ConnectionError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            frames: FrameBuffer::default(),
        })
    }

    /// Sends one statement and waits for its response.
    ///
    /// An empty statement asks the server to end the session, so the result
    /// will be [`ConnectionError::ClientDisconnected`].
    pub async fn send(&mut self, sql: &str) -> Result<String, ConnectionError> {
        self.stream.write_all(&encode_frame(sql)).await?;
        trace!(bytes = sql.len() + 1, "Sent statement");

        loop {
            if let Some(response) = self.frames.next_frame()? {
                return Ok(response);
            }
            if self.stream.read_buf(self.frames.buffer_mut()).await? == 0 {
                return Err(ConnectionError::ClientDisconnected);
            }
        }
    }
}

/// Doubles single quotes so `value` can sit inside a SQL string literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
