//! Connection Handler Module
//!
//! This module manages individual client sessions. Each accepted socket is
//! handled by its own async task; sessions never share in-memory state, only
//! the on-disk store behind the executor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                    (server.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read bytes  │───>│ Split on \0 │───>│ Execute SQL │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      ┌─────────────┐        │
//! │                                      │ Send resp\0 │        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use sqlgate::connection::{handle_connection, ConnectionConfig, ConnectionStats};
//! use sqlgate::executor::StatementExecutor;
//! use sqlgate::storage::Store;
//! use std::sync::Arc;
//!
//! let executor = StatementExecutor::new(Arc::new(Store::new("stomp_server.db")));
//! let stats = Arc::new(ConnectionStats::new());
//!
//! // For each accepted connection...
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, executor.clone(), stats, ConnectionConfig::default()));
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{
    handle_connection, ConnectionConfig, ConnectionError, ConnectionHandler, ConnectionStats,
};
