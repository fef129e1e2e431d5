//! Protocol module - markers, buffering, and frame extraction.
//!
//! This module implements the stream-to-frame core:
//! - 2-byte JPEG marker scanning
//! - Frame buffer for accumulating partial reads, with an overflow ceiling
//! - Extractor that slices complete frames and hands them to a sink

mod extractor;
mod frame;
mod frame_buffer;
mod marker;

pub use extractor::{locate_frame, FrameExtractor};
pub use frame::{build_frame, Frame};
pub use frame_buffer::{FrameBuffer, Overflow, DEFAULT_MAX_BUFFER_SIZE};
pub use marker::{find_marker, find_marker_from, Marker, MARKER_SIZE};
