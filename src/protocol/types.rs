//! Response Types
//!
//! Responses are plain text. There is no status byte or error frame: a failed
//! statement is reported in the normal response channel with a `SQL Error: `
//! prefix, and clients must pattern-match on that prefix.
//!
//! ## Examples
//!
//! Command succeeded: `done\0`
//! Query result: `1|alice\n2|bob\0`
//! Single value: `42\0`
//! No rows: `\0`
//! Failure: `SQL Error: no such table: T\0`

use crate::protocol::frame::encode_frame;
use bytes::Bytes;
use std::fmt;

/// Text returned for a command that executed successfully.
pub const DONE: &str = "done";

/// Prefix of every failure response.
pub const SQL_ERROR_PREFIX: &str = "SQL Error: ";

/// The outcome of one statement, as it will be sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A command ran and was committed.
    Done,

    /// A query ran; holds the encoded result set (possibly empty).
    Rows(String),

    /// The store rejected the statement; holds the store's message.
    SqlError(String),
}

impl Response {
    /// Creates a failure response from any store error.
    pub fn sql_error(err: impl fmt::Display) -> Self {
        Response::SqlError(err.to_string())
    }

    /// Returns true if this response reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::SqlError(_))
    }

    /// Serializes the response into a sentinel-terminated wire frame.
    pub fn serialize(&self) -> Bytes {
        encode_frame(&self.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Done => f.write_str(DONE),
            Response::Rows(text) => f.write_str(text),
            Response::SqlError(msg) => write!(f, "{}{}", SQL_ERROR_PREFIX, msg),
        }
    }
}
