//! Statement Execution Module
//!
//! This module turns framed SQL text into response text.
//!
//! ## Architecture
//!
//! ```text
//! SQL text
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ StatementKind   │  classify: SELECT... or not
//! └────────┬────────┘
//!          │
//!    ┌─────┴──────┐
//!    ▼            ▼
//!  query()    execute()      (storage module, fresh connection each)
//!    │            │
//!    ▼            ▼
//!  encode()     "done"
//!    │            │
//!    └─────┬──────┘
//!          ▼
//!      Response  (errors folded into "SQL Error: ...")
//! ```

pub mod encoder;
pub mod handler;

// Re-export the main executor
pub use encoder::encode;
pub use handler::{StatementExecutor, StatementKind};
