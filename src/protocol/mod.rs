//! Wire Protocol
//!
//! Requests and responses are UTF-8 text terminated by a single NUL byte.
//! No length prefix, no type tag, no version negotiation.
//!
//! ## Modules
//!
//! - `frame`: Sentinel scanning over an accumulating byte buffer
//! - `types`: The `Response` enum and its text rendering
//!
//! ## Example
//!
//! ```
//! use sqlgate::protocol::{FrameBuffer, Response};
//!
//! let mut frames = FrameBuffer::default();
//! frames.buffer_mut().extend_from_slice(b"SELECT 1\0");
//! assert_eq!(frames.next_frame().unwrap().as_deref(), Some("SELECT 1"));
//!
//! assert_eq!(&Response::Done.serialize()[..], b"done\0");
//! ```

pub mod frame;
pub mod types;

// Re-export commonly used types for convenience
pub use frame::{encode_frame, FrameBuffer, FrameError, DEFAULT_MAX_FRAME_SIZE, SENTINEL};
pub use types::{Response, DONE, SQL_ERROR_PREFIX};
