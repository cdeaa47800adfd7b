//! Statement Executor
//!
//! Turns raw SQL text into response text. The executor never fails: store
//! errors become `Response::SqlError` and are delivered to the client like
//! any other response.
//!
//! ## Classification
//!
//! The check is purely lexical. After trimming whitespace, text that starts
//! with `SELECT` (any case) is a query; everything else is a command.
//!
//! ```text
//! "  select * from Users"   -> Query
//! "INSERT INTO Users ..."   -> Command
//! "WITH t AS (...) SELECT"  -> Command   (no SQL parsing happens)
//! "/* c */ SELECT 1"        -> Command
//! ```
//!
//! A query that lands on the command path still runs; its rows are discarded
//! and the client sees `done`.

use crate::executor::encoder::encode;
use crate::protocol::Response;
use crate::storage::{Store, StoreError};
use std::sync::Arc;
use tracing::{debug, error};

const QUERY_KEYWORD: &str = "SELECT";

/// Which store path a statement is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Read path: rows are fetched and encoded.
    Query,
    /// Write path: executed for effect and committed.
    Command,
}

impl StatementKind {
    /// Classifies statement text by its leading keyword.
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        match text.get(..QUERY_KEYWORD.len()) {
            Some(head) if head.eq_ignore_ascii_case(QUERY_KEYWORD) => StatementKind::Query,
            _ => StatementKind::Command,
        }
    }
}

/// Executes statements against the shared store.
#[derive(Debug, Clone)]
pub struct StatementExecutor {
    store: Arc<Store>,
}

impl StatementExecutor {
    /// Creates an executor for the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Runs one statement and returns the response to send.
    ///
    /// Blocks on the store. Use [`execute_async`](Self::execute_async) from async code.
    pub fn execute(&self, text: &str) -> Response {
        let kind = StatementKind::classify(text);
        debug!(?kind, "Executing statement");

        let outcome = match kind {
            StatementKind::Query => self
                .store
                .query(text)
                .map(|set| Response::Rows(encode(&set.rows))),
            StatementKind::Command => self.store.execute(text).map(|()| Response::Done),
        };

        outcome.unwrap_or_else(|e| {
            debug!(error = %e, "Statement failed");
            Response::sql_error(e)
        })
    }

    /// Runs one statement on the blocking thread pool.
    pub async fn execute_async(&self, text: String) -> Response {
        let executor = self.clone();
        match tokio::task::spawn_blocking(move || executor.execute(&text)).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Statement task did not complete");
                Response::sql_error(StoreError::Worker(e.to_string()))
            }
        }
    }
}
