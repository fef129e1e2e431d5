//! Error types for mjpeg-frames.

use thiserror::Error;

/// Main error type for all stream operations.
///
/// Buffer overflow and out-of-order markers are not errors: the first is
/// reported as an [`Overflow`](crate::protocol::Overflow) event, the second
/// simply means more data is needed.
#[derive(Debug, Error)]
pub enum MjpegError {
    /// Read failure or abrupt disconnect. Fatal to the session.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP response preceding the stream body was unusable.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A frame sink rejected a frame.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Attempt to consume more bytes than the buffer holds.
    #[error("Cannot consume {requested} bytes, only {available} buffered")]
    ConsumeOutOfRange { requested: usize, available: usize },
}

/// Result type alias using MjpegError.
pub type Result<T> = std::result::Result<T, MjpegError>;
