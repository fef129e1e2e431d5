//! Transport module - opening the MJPEG connection.
//!
//! Provides:
//! - HTTP `GET` request formatting
//! - Response header skipping (async and blocking)
//! - TCP stream openers that return a reader positioned at the body

mod http;

pub use http::{
    build_request, open_stream, open_stream_blocking, skip_response_headers,
    skip_response_headers_blocking, ResponseHead,
};
