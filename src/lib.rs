//! # mjpeg-frames
//!
//! Extracts individual JPEG frames from a continuous MJPEG byte stream.
//!
//! An MJPEG stream is a sequence of JPEG images sent back to back over one
//! connection. This crate accumulates the incoming bytes, finds each image by
//! its start (`FF D8`) and end (`FF D9`) markers, and hands complete images
//! to a [`FrameSink`] one at a time, in arrival order, with a hard ceiling on
//! buffered memory.
//!
//! ## Architecture
//!
//! - **Marker scanner** ([`protocol::find_marker`]): pure 2-byte search
//! - **Frame buffer** ([`protocol::FrameBuffer`]): accumulates reads, wiped on overflow
//! - **Frame extractor** ([`protocol::FrameExtractor`]): slices frames out of the buffer
//! - **Session** ([`StreamSession`]): owns the above and runs the read loop
//! - **Transport** ([`transport`]): opens the HTTP connection carrying the stream
//!
//! ## Example
//!
//! ```ignore
//! use mjpeg_frames::{DirectorySink, StreamSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = StreamSession::builder()
//!         .host("192.168.4.1")
//!         .path("/stream")
//!         .build()?;
//!
//!     let mut sink = DirectorySink::create("frames")?;
//!     let summary = session.connect_and_run(&mut sink).await?;
//!     println!("{} frames", summary.stats.frames_delivered);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod sink;
pub mod transport;

mod session;

pub use config::StreamConfig;
pub use error::{MjpegError, Result};
pub use session::{ChunkOutcome, SessionBuilder, SessionStats, SessionSummary, StreamSession};
pub use sink::{CollectSink, DirectorySink, FrameSink};
