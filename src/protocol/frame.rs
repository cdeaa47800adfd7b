//! Sentinel-Delimited Framing
//!
//! Every message on the wire, request or response, is UTF-8 text followed by
//! a single NUL byte. There is no length prefix, so a frame boundary can only
//! be found by scanning the accumulated bytes for the first sentinel.
//!
//! ## How the Buffer Works
//!
//! ```text
//!   read_buf()          read_buf()
//!      │                   │
//!      ▼                   ▼
//! ┌──────────────┬───────────────────────┐
//! │ SELECT x FRO │ M T\0INSERT INTO T... │
//! └──────────────┴───────────────────────┘
//!                      ▲
//!                      └── first sentinel: "SELECT x FROM T" is surfaced,
//!                          "INSERT INTO T..." stays buffered for next_frame()
//! ```
//!
//! Bytes that follow a sentinel in the same read are kept for the next call,
//! so pipelined requests are answered one by one instead of being dropped.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// The byte that terminates every frame.
pub const SENTINEL: u8 = 0;

/// Default upper bound on an unterminated frame (16 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Errors that can occur while assembling a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The peer sent more bytes than allowed without a sentinel
    #[error("frame too large: {size} bytes without a terminator (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// Accumulates raw stream bytes and splits them into sentinel-terminated frames.
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: BytesMut,
    /// Prefix of `buffer` already known to hold no sentinel
    scanned: usize,
    max_frame_size: usize,
}

impl FrameBuffer {
    /// Creates an empty buffer that rejects frames larger than `max_frame_size`.
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            scanned: 0,
            max_frame_size,
        }
    }

    /// The underlying buffer, for reading more stream data into.
    ///
    /// Callers must only append; the scan offset assumes existing bytes are unchanged.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }
        &mut self.buffer
    }

    /// Pops the next complete frame, decoded as lossy UTF-8.
    ///
    /// Returns `Ok(None)` when no sentinel has arrived yet.
    pub fn next_frame(&mut self) -> Result<Option<String>, FrameError> {
        let found = self.buffer[self.scanned..]
            .iter()
            .position(|&b| b == SENTINEL);

        match found {
            Some(offset) => {
                let frame = self.buffer.split_to(self.scanned + offset);
                self.buffer.advance(1);
                self.scanned = 0;
                Ok(Some(String::from_utf8_lossy(&frame).into_owned()))
            }
            None => {
                self.scanned = self.buffer.len();
                if self.buffer.len() > self.max_frame_size {
                    return Err(FrameError::TooLarge {
                        size: self.buffer.len(),
                        max: self.max_frame_size,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Number of buffered bytes not yet returned as a frame.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discards everything buffered.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

/// Encodes `text` as a wire frame: its UTF-8 bytes followed by one sentinel.
pub fn encode_frame(text: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(text.len() + 1);
    buf.put_slice(text.as_bytes());
    buf.put_u8(SENTINEL);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(frames: &mut FrameBuffer, data: &[u8]) {
        frames.buffer_mut().extend_from_slice(data);
    }

    #[test]
    fn test_single_frame() {
        let mut frames = FrameBuffer::default();
        feed(&mut frames, b"SELECT 1\0");

        assert_eq!(frames.next_frame().unwrap(), Some("SELECT 1".to_string()));
        assert_eq!(frames.next_frame().unwrap(), None);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_incomplete_frame() {
        let mut frames = FrameBuffer::default();
        feed(&mut frames, b"SELECT");

        assert_eq!(frames.next_frame().unwrap(), None);
        assert_eq!(frames.len(), 6);
    }

    #[test]
    fn test_frame_split_across_reads() {
        let mut frames = FrameBuffer::default();
        feed(&mut frames, b"SELECT x ");
        assert_eq!(frames.next_frame().unwrap(), None);
        feed(&mut frames, b"FROM ");
        assert_eq!(frames.next_frame().unwrap(), None);
        feed(&mut frames, b"T\0");

        assert_eq!(
            frames.next_frame().unwrap(),
            Some("SELECT x FROM T".to_string())
        );
    }

    #[test]
    fn test_pipelined_frames_are_kept() {
        let mut frames = FrameBuffer::default();
        feed(&mut frames, b"CREATE TABLE T(x)\0INSERT INTO T VALUES (1)\0SEL");

        assert_eq!(
            frames.next_frame().unwrap(),
            Some("CREATE TABLE T(x)".to_string())
        );
        assert_eq!(
            frames.next_frame().unwrap(),
            Some("INSERT INTO T VALUES (1)".to_string())
        );
        assert_eq!(frames.next_frame().unwrap(), None);

        feed(&mut frames, b"ECT x FROM T\0");
        assert_eq!(
            frames.next_frame().unwrap(),
            Some("SELECT x FROM T".to_string())
        );
    }

    #[test]
    fn test_empty_frame() {
        let mut frames = FrameBuffer::default();
        feed(&mut frames, b"\0");

        assert_eq!(frames.next_frame().unwrap(), Some(String::new()));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut frames = FrameBuffer::default();
        feed(&mut frames, b"SELECT '\xff'\0");

        assert_eq!(
            frames.next_frame().unwrap(),
            Some("SELECT '\u{FFFD}'".to_string())
        );
    }

    #[test]
    fn test_frame_too_large() {
        let mut frames = FrameBuffer::new(8);
        feed(&mut frames, b"0123456789");

        assert_eq!(
            frames.next_frame(),
            Err(FrameError::TooLarge { size: 10, max: 8 })
        );
    }

    #[test]
    fn test_large_frame_with_sentinel_is_accepted() {
        let mut frames = FrameBuffer::new(8);
        feed(&mut frames, b"01234567\0");

        assert_eq!(frames.next_frame().unwrap(), Some("01234567".to_string()));
    }

    #[test]
    fn test_encode_frame() {
        assert_eq!(&encode_frame("done")[..], b"done\0");
        assert_eq!(&encode_frame("")[..], b"\0");
    }
}
