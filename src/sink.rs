//! Frame sinks - consumers of extracted frames.
//!
//! The extractor calls [`FrameSink::on_frame`] synchronously for every frame
//! and does not read more data until the call returns, so a slow sink slows
//! the whole stream down instead of growing a queue.
//!
//! Closures work as sinks directly:
//!
//! ```
//! use mjpeg_frames::protocol::Frame;
//! use mjpeg_frames::{FrameSink, Result};
//!
//! let mut sizes = Vec::new();
//! let mut sink = |frame: Frame<'_>| -> Result<()> {
//!     sizes.push(frame.len());
//!     Ok(())
//! };
//! # let bytes = mjpeg_frames::protocol::build_frame(b"x");
//! sink.on_frame(Frame::new(&bytes, 0)).unwrap();
//! # drop(sink);
//! # assert_eq!(sizes, vec![5]);
//! ```

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{MjpegError, Result};
use crate::protocol::Frame;

/// Receives frames one at a time, in stream order.
pub trait FrameSink {
    /// Handle one frame.
    ///
    /// The frame borrows the extraction buffer and must be copied if it is
    /// needed after this call returns. Returning an error ends the session.
    fn on_frame(&mut self, frame: Frame<'_>) -> Result<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(Frame<'_>) -> Result<()>,
{
    fn on_frame(&mut self, frame: Frame<'_>) -> Result<()> {
        self(frame)
    }
}

/// Sink that copies every frame into memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    frames: Vec<Bytes>,
}

impl CollectSink {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames collected so far.
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }

    /// Number of collected frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Consume the collector and return its frames.
    pub fn into_frames(self) -> Vec<Bytes> {
        self.frames
    }
}

impl FrameSink for CollectSink {
    fn on_frame(&mut self, frame: Frame<'_>) -> Result<()> {
        self.frames.push(frame.to_bytes());
        Ok(())
    }
}

/// Sink that writes each frame to `<dir>/<prefix><sequence>.jpg`.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    prefix: String,
    written: u64,
}

impl DirectorySink {
    /// Create a sink writing into `dir`, creating it if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: "frame-".to_string(),
            written: 0,
        })
    }

    /// Set the file name prefix (default `frame-`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Path a frame with the given sequence number is written to.
    pub fn path_for(&self, sequence: u64) -> PathBuf {
        self.dir.join(format!("{}{:06}.jpg", self.prefix, sequence))
    }

    /// Number of files written.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for DirectorySink {
    fn on_frame(&mut self, frame: Frame<'_>) -> Result<()> {
        let path = self.path_for(frame.sequence());
        std::fs::write(&path, frame.as_bytes())
            .map_err(|e| MjpegError::Sink(format!("{}: {}", path.display(), e)))?;
        self.written += 1;
        Ok(())
    }
}
