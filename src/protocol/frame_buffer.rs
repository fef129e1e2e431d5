//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` so consuming a prefix only advances the start of
//! the buffer instead of shifting the remaining bytes. Capacity is reserved
//! up front so steady-state appends do not reallocate.
//!
//! The buffer knows nothing about JPEG markers. Its only policy is the size
//! ceiling: when the accumulated length exceeds it, everything is dropped and
//! an [`Overflow`] event is returned to the caller.
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::with_capacity(16);
//! buffer.append(&[1, 2, 3, 4, 5]);
//! assert!(buffer.enforce_ceiling(8).is_none());
//!
//! buffer.consume_prefix(2).unwrap();
//! assert_eq!(buffer.as_slice(), &[3, 4, 5]);
//!
//! buffer.append(&[0; 6]);
//! let overflow = buffer.enforce_ceiling(8).unwrap();
//! assert_eq!(overflow.discarded, 9);
//! assert!(buffer.is_empty());
//! ```

use bytes::{Buf, BytesMut};

use crate::error::{MjpegError, Result};

/// Default buffer capacity and overflow ceiling: 64KB.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Reported when the buffer grew past its ceiling and was wiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Number of bytes that were discarded.
    pub discarded: usize,
    /// The ceiling that was exceeded.
    pub ceiling: usize,
}

/// Ordered byte accumulator shared by the scanner and the extractor.
///
/// Bytes are kept in arrival order and never reordered or duplicated.
#[derive(Debug)]
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Create a new frame buffer with the default 64KB capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_BUFFER_SIZE)
    }

    /// Create a new frame buffer with custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a chunk to the end of the buffer.
    ///
    /// No length limit is enforced here; see [`enforce_ceiling`](Self::enforce_ceiling).
    #[inline]
    pub fn append(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Discard the whole buffer if it holds more than `max_size` bytes.
    ///
    /// A length equal to `max_size` is tolerated.
    pub fn enforce_ceiling(&mut self, max_size: usize) -> Option<Overflow> {
        if self.buffer.len() <= max_size {
            return None;
        }

        let discarded = self.buffer.len();
        self.buffer.clear();
        Some(Overflow {
            discarded,
            ceiling: max_size,
        })
    }

    /// Remove the first `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MjpegError::ConsumeOutOfRange`] if `n` exceeds the buffered
    /// length; the buffer is left untouched in that case.
    pub fn consume_prefix(&mut self, n: usize) -> Result<()> {
        if n > self.buffer.len() {
            return Err(MjpegError::ConsumeOutOfRange {
                requested: n,
                available: self.buffer.len(),
            });
        }

        self.buffer.advance(n);
        Ok(())
    }

    /// View of the buffered bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the number of buffered bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current allocated capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Drop all buffered bytes, keeping the allocation.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
