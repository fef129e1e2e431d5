//! Frame extractor - slices complete frames out of a [`FrameBuffer`].
//!
//! Each pass repeats until no complete frame remains:
//! - locate the first start marker and the first end marker after it
//! - hand `[start, end + 2)` to the sink
//! - drop everything up to and including the end marker
//!
//! An end marker that precedes the first start marker is never paired with
//! it. It is skipped over (not treated as a loss of sync) and disappears with
//! the consumed prefix once the following frame completes.
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::protocol::{build_frame, FrameBuffer, FrameExtractor};
//! use mjpeg_frames::CollectSink;
//!
//! let mut buffer = FrameBuffer::new();
//! buffer.append(&build_frame(b"first"));
//! buffer.append(&build_frame(b"second"));
//!
//! let mut extractor = FrameExtractor::new();
//! let mut sink = CollectSink::new();
//! assert_eq!(extractor.extract_all(&mut buffer, &mut sink).unwrap(), 2);
//! assert!(buffer.is_empty());
//! ```

use super::frame::Frame;
use super::frame_buffer::FrameBuffer;
use super::marker::{find_marker, find_marker_from, Marker, MARKER_SIZE};
use crate::error::Result;
use crate::sink::FrameSink;

/// Locate the first complete frame in `span`.
///
/// Returns `(start, end)` where `start` is the index of the start marker and
/// `end` the index of the end marker, so the frame is `span[start..end + 2]`.
/// Always `end > start`.
pub fn locate_frame(span: &[u8]) -> Option<(usize, usize)> {
    let start = find_marker(span, Marker::START)?;
    let end = match find_marker(span, Marker::END)? {
        end if end > start => end,
        // Orphaned end marker ahead of the start marker
        _ => find_marker_from(span, start + MARKER_SIZE, Marker::END)?,
    };
    Some((start, end))
}

/// Drives the marker scanner over a buffer and delivers frames.
///
/// Holds no bytes itself; it only numbers the frames it delivers.
#[derive(Debug, Default)]
pub struct FrameExtractor {
    next_sequence: u64,
}

impl FrameExtractor {
    /// Create an extractor whose first frame gets sequence 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames handed to a sink so far.
    pub fn delivered(&self) -> u64 {
        self.next_sequence
    }

    /// Deliver every complete frame in `buffer` to `sink`.
    ///
    /// Returns the number of frames delivered in this pass. Running it again
    /// without new data delivers nothing and leaves the buffer unchanged.
    ///
    /// # Errors
    ///
    /// A sink error stops the pass and is returned. The rejected frame has
    /// already been consumed from the buffer and is not delivered again.
    pub fn extract_all<S>(&mut self, buffer: &mut FrameBuffer, sink: &mut S) -> Result<usize>
    where
        S: FrameSink + ?Sized,
    {
        let mut count = 0;

        while let Some(frame_end) = self.deliver_one(buffer, sink)? {
            buffer.consume_prefix(frame_end)?;
            count += 1;
        }

        Ok(count)
    }

    /// Deliver the first complete frame, returning how many bytes to consume.
    fn deliver_one<S>(&mut self, buffer: &mut FrameBuffer, sink: &mut S) -> Result<Option<usize>>
    where
        S: FrameSink + ?Sized,
    {
        let span = buffer.as_slice();
        let Some((start, end)) = locate_frame(span) else {
            return Ok(None);
        };
        let frame_end = end + MARKER_SIZE;

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        tracing::debug!(
            "Delivering frame {} ({} bytes, {} skipped)",
            sequence,
            frame_end - start,
            start
        );

        if let Err(e) = sink.on_frame(Frame::new(&span[start..frame_end], sequence)) {
            buffer.consume_prefix(frame_end)?;
            return Err(e);
        }

        Ok(Some(frame_end))
    }
}
