//! Borrowed view of one JPEG frame.
//!
//! A [`Frame`] points into the extractor's buffer and is only valid for the
//! duration of a sink call. Sinks that need to keep the image copy it with
//! [`Frame::to_bytes`].
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::protocol::{build_frame, Frame};
//!
//! let bytes = build_frame(b"pixels");
//! let frame = Frame::new(&bytes, 0);
//!
//! assert_eq!(frame.len(), 10);
//! assert_eq!(frame.body(), b"pixels");
//! ```

use bytes::Bytes;

use super::marker::{Marker, MARKER_SIZE};

/// One complete JPEG image, start and end markers included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    bytes: &'a [u8],
    sequence: u64,
}

impl<'a> Frame<'a> {
    /// Wrap a delimited byte range.
    ///
    /// `sequence` is the zero-based position of the frame in its stream.
    pub fn new(bytes: &'a [u8], sequence: u64) -> Self {
        debug_assert!(bytes.starts_with(&Marker::START.bytes()));
        debug_assert!(bytes.ends_with(&Marker::END.bytes()));
        Self { bytes, sequence }
    }

    /// The full frame, `FF D8` through `FF D9`.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Bytes between the start and end markers.
    #[inline]
    pub fn body(&self) -> &'a [u8] {
        let end = self.bytes.len().saturating_sub(MARKER_SIZE).max(MARKER_SIZE);
        &self.bytes[MARKER_SIZE..end]
    }

    /// Total frame length including both markers.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for frames produced by the extractor.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Position of this frame in the stream, starting at 0.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Copy the frame out of the extraction buffer.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.bytes)
    }
}

impl AsRef<[u8]> for Frame<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

/// Build a frame as a single byte vector: start marker, `body`, end marker.
pub fn build_frame(body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 * MARKER_SIZE + body.len());
    buf.extend_from_slice(&Marker::START.bytes());
    buf.extend_from_slice(body);
    buf.extend_from_slice(&Marker::END.bytes());
    buf
}
