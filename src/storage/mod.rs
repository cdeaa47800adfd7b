//! Storage Module
//!
//! The gateway does not own its data: it forwards statements to one shared
//! SQLite file. This module wraps that file in a `Store` handle that is
//! passed explicitly to every executor, so tests can point each server at
//! its own temporary database.
//!
//! ## Features
//!
//! - **Scoped Connections**: Each statement opens and closes its own connection
//! - **Engine-Level Locking**: Concurrent writers wait on SQLite's busy timeout
//! - **Eager Results**: Queries are fully materialized into a `ResultSet`
//! - **Idempotent Bootstrap**: `init_schema` creates missing tables only
//!
//! ## Example
//!
//! ```no_run
//! use sqlgate::storage::Store;
//!
//! let store = Store::new("stomp_server.db");
//! store.init_schema()?;
//! store.execute("INSERT INTO Users VALUES ('alice', 'secret')")?;
//! let result = store.query("SELECT username FROM Users")?;
//! assert_eq!(result.len(), 1);
//! # Ok::<(), sqlgate::storage::StoreError>(())
//! ```

pub mod engine;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use engine::{Store, StoreError, StoreResult, DEFAULT_BUSY_TIMEOUT};
pub use value::{ResultSet, Row, Value};
