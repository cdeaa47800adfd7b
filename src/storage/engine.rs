//! Shared Store Handle
//!
//! `Store` names one on-disk SQLite database and knows how to run a single
//! statement against it. It holds no connection: every call opens its own,
//! runs exactly one statement, and drops the connection before returning,
//! so no lock is held between client messages.
//!
//! ## Concurrency
//!
//! ```text
//!  session A ──> open ─> INSERT ─> commit ─> close
//!  session B ──────> open ─> [busy: wait] ──> UPDATE ─> commit ─> close
//!                               ▲
//!                               └── SQLite's own writer lock, bounded by busy_timeout
//! ```
//!
//! Writers are serialized by the engine itself. The busy timeout turns a
//! short lock wait into a retry instead of an immediate `database is locked`.
//!
//! All methods block; async callers go through `spawn_blocking`.

use crate::storage::schema::SCHEMA;
use crate::storage::value::{ResultSet, Row, Value};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// How long a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The engine rejected the statement or the file could not be opened
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking task running the statement did not complete
    #[error("store worker failed: {0}")]
    Worker(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A handle to the shared database file.
///
/// Cloning is cheap and every clone refers to the same file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    /// Creates a handle for the database at `path`. The file is created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Overrides how long a statement waits for a competing writer.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> StoreResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Creates the bootstrap tables if they are missing.
    pub fn init_schema(&self) -> StoreResult<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        for ddl in SCHEMA {
            tx.execute_batch(ddl)?;
        }
        tx.commit()?;
        debug!(path = %self.path.display(), "Schema initialized");
        Ok(())
    }

    /// Runs one mutating or DDL statement and commits it.
    ///
    /// Rows produced by the statement (a `PRAGMA`, a `RETURNING` clause) are
    /// stepped through and discarded. A transaction the statement leaves
    /// open, such as a bare `BEGIN`, is committed before the connection closes.
    pub fn execute(&self, sql: &str) -> StoreResult<()> {
        if sql.trim().is_empty() {
            return Ok(());
        }

        let conn = self.open()?;
        {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query([])?;
            while rows.next()?.is_some() {}
        }

        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        trace!(path = %self.path.display(), "Command committed");
        Ok(())
    }

    /// Runs one read statement and fetches its entire result set.
    pub fn query(&self, sql: &str) -> StoreResult<ResultSet> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut result = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values: Row = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from(row.get_ref(i)?));
            }
            result.push(values);
        }

        trace!(
            path = %self.path.display(),
            rows = result.len(),
            columns = width,
            "Query fetched"
        );
        Ok(ResultSet::new(columns, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::TABLES;
    use tempfile::TempDir;

    fn create_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("test.db"));
        (dir, store)
    }

    #[test]
    fn test_execute_and_query() {
        let (_dir, store) = create_store();

        store.execute("CREATE TABLE T(x INTEGER, y TEXT)").unwrap();
        store.execute("INSERT INTO T VALUES (1, 'a')").unwrap();
        store.execute("INSERT INTO T VALUES (2, NULL)").unwrap();

        let result = store.query("SELECT x, y FROM T ORDER BY x").unwrap();
        assert_eq!(result.columns, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(
            result.rows,
            vec![
                vec![Value::Integer(1), Value::Text("a".into())],
                vec![Value::Integer(2), Value::Null],
            ]
        );
    }

    #[test]
    fn test_query_empty() {
        let (_dir, store) = create_store();
        store.execute("CREATE TABLE T(x INTEGER)").unwrap();

        let result = store.query("SELECT x FROM T").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns, vec!["x".to_string()]);
    }

    #[test]
    fn test_data_persists_across_handles() {
        let (_dir, store) = create_store();
        store.execute("CREATE TABLE T(x INTEGER)").unwrap();
        store.execute("INSERT INTO T VALUES (9)").unwrap();

        let other = Store::new(store.path());
        let result = other.query("SELECT x FROM T").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(9)]]);
    }

    #[test]
    fn test_syntax_error() {
        let (_dir, store) = create_store();

        let err = store.execute("SELEC").unwrap_err();
        assert!(err.to_string().contains("syntax error"), "{}", err);
    }

    #[test]
    fn test_missing_table() {
        let (_dir, store) = create_store();

        let err = store.query("SELECT * FROM Nope").unwrap_err();
        assert!(err.to_string().contains("no such table"), "{}", err);
    }

    #[test]
    fn test_constraint_violation() {
        let (_dir, store) = create_store();
        store.init_schema().unwrap();
        store
            .execute("INSERT INTO Users VALUES ('alice', 'pw')")
            .unwrap();

        let err = store
            .execute("INSERT INTO Users VALUES ('alice', 'other')")
            .unwrap_err();
        assert!(err.to_string().contains("UNIQUE"), "{}", err);
    }

    #[test]
    fn test_begin_is_committed() {
        let (_dir, store) = create_store();
        store.execute("CREATE TABLE T(x INTEGER)").unwrap();
        store.execute("BEGIN").unwrap();

        // The next connection must not find the file locked.
        store.execute("INSERT INTO T VALUES (1)").unwrap();
        let result = store.query("SELECT COUNT(*) FROM T").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(1)]]);
    }

    #[test]
    fn test_busy_timeout_gives_up_on_locked_file() {
        let (_dir, store) = create_store();
        store.execute("CREATE TABLE T(x INTEGER)").unwrap();
        let store = store.with_busy_timeout(Duration::from_millis(20));

        let holder = Connection::open(store.path()).unwrap();
        holder.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let err = store.execute("INSERT INTO T VALUES (1)").unwrap_err();
        assert!(err.to_string().contains("locked"), "{}", err);

        holder.execute_batch("COMMIT").unwrap();
        store.execute("INSERT INTO T VALUES (1)").unwrap();
    }

    #[test]
    fn test_blank_command_is_noop() {
        let (_dir, store) = create_store();
        store.execute("   \n").unwrap();
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let (_dir, store) = create_store();
        store.init_schema().unwrap();
        store.init_schema().unwrap();

        for table in TABLES {
            let result = store
                .query(&format!(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name='{}'",
                    table
                ))
                .unwrap();
            assert_eq!(result.len(), 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_init_schema_fails_on_bad_path() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("missing").join("test.db"));

        assert!(store.init_schema().is_err());
    }
}
