//! # sqlgate - A NUL-Framed SQL Gateway
//!
//! sqlgate accepts TCP clients that send raw SQL text terminated by a NUL
//! byte, runs each statement against one shared SQLite file, and answers
//! with NUL-terminated text.
//!
//! ## Features
//!
//! - **Trivial Wire Format**: UTF-8 text plus a `\0` sentinel in both directions
//! - **Deterministic Text Results**: `done`, bare scalars, or `|`/newline tables
//! - **Errors In Band**: store failures come back as `SQL Error: <message>`
//! - **Async I/O**: Built on Tokio, one task per client session
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              sqlgate                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│ Statement   │                  │
//! │  │ (Listener)  │    │  Handler    │    │ Executor    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │                     ┌─────────────┐    ┌──────────────────────────────┐ │
//! │                     │ FrameBuffer │    │ Store (one file, a fresh     │ │
//! │                     │ split on \0 │    │ connection per statement)    │ │
//! │                     └─────────────┘    └──────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Exchange
//!
//! ```text
//! C: CREATE TABLE T(x INTEGER)\0     S: done\0
//! C: INSERT INTO T VALUES (5)\0      S: done\0
//! C: SELECT x FROM T\0               S: 5\0
//! C: SELEC\0                         S: SQL Error: near "SELEC": syntax error\0
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use sqlgate::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (server, report) = Server::bind(ServerConfig::default()).await?;
//!     if let Err(e) = &report.schema {
//!         eprintln!("running without schema: {}", e);
//!     }
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: NUL framing and response rendering
//! - [`storage`]: Store handle, result values, bootstrap schema
//! - [`executor`]: Statement classification and result encoding
//! - [`connection`]: Per-client session loop
//! - [`server`]: Listener and dispatch loop
//! - [`client`]: Async client for the same protocol

pub mod client;
pub mod connection;
pub mod executor;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use client::{escape_literal, GatewayClient};
pub use connection::{handle_connection, ConnectionConfig, ConnectionError, ConnectionStats};
pub use executor::{encode, StatementExecutor, StatementKind};
pub use protocol::{FrameBuffer, FrameError, Response};
pub use server::{Server, ServerConfig, ServerError, StartupReport};
pub use storage::{ResultSet, Store, StoreError, Value};

/// Name reported in startup and shutdown logs
pub const SERVER_NAME: &str = "STOMP_PYTHON_SQL_SERVER";

/// The default port sqlgate listens on
pub const DEFAULT_PORT: u16 = 7778;

/// The default host sqlgate binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Database file shared by all sessions
pub const DEFAULT_DB_FILE: &str = "stomp_server.db";

/// Version of sqlgate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
