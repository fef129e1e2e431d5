//! JPEG marker constants and the marker scanner.
//!
//! Every JPEG image starts with start-of-image (`FF D8`) and ends with
//! end-of-image (`FF D9`). An MJPEG stream is a concatenation of such images,
//! so locating these two markers is all that is needed to slice frames.
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::protocol::{find_marker, Marker};
//!
//! let data = [0x00, 0xFF, 0xD8, 0x01, 0xFF, 0xD9];
//! assert_eq!(find_marker(&data, Marker::START), Some(1));
//! assert_eq!(find_marker(&data, Marker::END), Some(4));
//! assert_eq!(find_marker(&data[..1], Marker::START), None);
//! ```

/// Size of a marker in bytes.
pub const MARKER_SIZE: usize = 2;

/// A two-byte marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(pub [u8; MARKER_SIZE]);

impl Marker {
    /// JPEG start-of-image.
    pub const START: Marker = Marker([0xFF, 0xD8]);

    /// JPEG end-of-image.
    pub const END: Marker = Marker([0xFF, 0xD9]);

    /// Create a marker from its two bytes.
    #[inline]
    pub const fn new(b1: u8, b2: u8) -> Self {
        Self([b1, b2])
    }

    /// Raw marker bytes.
    #[inline]
    pub const fn bytes(&self) -> [u8; MARKER_SIZE] {
        self.0
    }
}

/// Find the lowest index `i` where `span[i..i + 2]` equals `marker`.
///
/// Returns `None` when the marker is absent, which includes every span
/// shorter than two bytes. Single pass, no allocation.
#[inline]
pub fn find_marker(span: &[u8], marker: Marker) -> Option<usize> {
    let [b1, b2] = marker.0;
    if span.len() < MARKER_SIZE {
        return None;
    }

    // The last byte can never start a marker
    let last = span.len() - 1;
    let mut offset = 0;
    while let Some(pos) = span[offset..last].iter().position(|&b| b == b1) {
        let i = offset + pos;
        if span[i + 1] == b2 {
            return Some(i);
        }
        offset = i + 1;
    }
    None
}

/// Find `marker` at or after `from`, returning an index into the full span.
#[inline]
pub fn find_marker_from(span: &[u8], from: usize, marker: Marker) -> Option<usize> {
    span.get(from..)
        .and_then(|rest| find_marker(rest, marker))
        .map(|i| from + i)
}
