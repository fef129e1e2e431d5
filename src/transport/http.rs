//! Minimal HTTP/1.1 client side of an MJPEG stream.
//!
//! The server answers a plain `GET` with a response head followed by an
//! endless `multipart/x-mixed-replace` body. Only the head is consumed here;
//! the body (boundaries, part headers and JPEG data) is left for the frame
//! extractor, which ignores everything outside the JPEG markers.
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::transport::{build_request, skip_response_headers_blocking};
//! use std::io::Read;
//!
//! assert_eq!(
//!     build_request("cam.local", "/stream"),
//!     "GET /stream HTTP/1.1\r\nHost: cam.local\r\n\r\n"
//! );
//!
//! let mut response: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace\r\n\r\nBODY";
//! let head = skip_response_headers_blocking(&mut response).unwrap();
//! assert_eq!(head.status_code, Some(200));
//!
//! let mut body = String::new();
//! response.read_to_string(&mut body).unwrap();
//! assert_eq!(body, "BODY");
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::StreamConfig;
use crate::error::{MjpegError, Result};

/// Upper bound on the size of the response head.
const MAX_HEAD_SIZE: usize = 16 * 1024;

/// Format the `GET` request that starts the stream.
pub fn build_request(host: &str, path: &str) -> String {
    format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, host)
}

/// What was seen of the response head before the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseHead {
    /// First line of the response, without line terminator.
    pub status_line: String,
    /// Numeric status code, if the status line could be parsed.
    pub status_code: Option<u16>,
    /// Number of header lines skipped.
    pub header_count: usize,
}

impl ResponseHead {
    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(200..=299))
    }
}

/// Line-by-line accumulator shared by the async and blocking readers.
#[derive(Default)]
struct HeadParser {
    head: ResponseHead,
    seen_status: bool,
    total: usize,
}

impl HeadParser {
    /// Bytes the next line may hold; one past the budget so overruns are seen.
    fn remaining(&self) -> u64 {
        (MAX_HEAD_SIZE - self.total + 1) as u64
    }

    /// Feed one line, terminator included. Returns `true` at the blank line.
    fn feed(&mut self, line: &[u8]) -> Result<bool> {
        self.total += line.len();
        if self.total > MAX_HEAD_SIZE {
            return Err(MjpegError::Http(format!(
                "response head exceeds {} bytes",
                MAX_HEAD_SIZE
            )));
        }

        let trimmed = trim_line_end(line);
        if trimmed.is_empty() {
            return Ok(true);
        }

        if self.seen_status {
            self.head.header_count += 1;
        } else {
            self.seen_status = true;
            self.head.status_line = String::from_utf8_lossy(trimmed).into_owned();
            self.head.status_code = self
                .head
                .status_line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse().ok());
        }
        Ok(false)
    }

    /// Called on EOF or at the blank line.
    fn finish(self) -> Result<ResponseHead> {
        if !self.seen_status {
            return Err(MjpegError::Http(
                "connection closed before response".into(),
            ));
        }
        if !self.head.is_success() {
            tracing::warn!("Unexpected stream response: {}", self.head.status_line);
        }
        Ok(self.head)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Read and discard the response head, stopping after the blank line.
///
/// Also stops at EOF once a status line has been seen. A non-2xx status is
/// logged but not rejected.
pub async fn skip_response_headers<R>(reader: &mut R) -> Result<ResponseHead>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = HeadParser::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        let mut limited = AsyncReadExt::take(&mut *reader, parser.remaining());
        if limited.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if parser.feed(&line)? {
            break;
        }
    }

    parser.finish()
}

/// Blocking version of [`skip_response_headers`].
pub fn skip_response_headers_blocking<R>(reader: &mut R) -> Result<ResponseHead>
where
    R: std::io::BufRead,
{
    let mut parser = HeadParser::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        let mut limited = std::io::Read::take(&mut *reader, parser.remaining());
        if std::io::BufRead::read_until(&mut limited, b'\n', &mut line)? == 0 {
            break;
        }
        if parser.feed(&line)? {
            break;
        }
    }

    parser.finish()
}

/// Connect, send the request and return a reader positioned at the body.
pub async fn open_stream(config: &StreamConfig) -> Result<BufReader<TcpStream>> {
    config.validate()?;
    tracing::info!("Opening MJPEG stream http://{}{}", config.address(), config.path);

    let mut stream = TcpStream::connect(config.address()).await?;
    stream
        .write_all(build_request(&config.host, &config.path).as_bytes())
        .await?;

    let mut reader = BufReader::with_capacity(config.chunk_size, stream);
    let head = skip_response_headers(&mut reader).await?;

    tracing::info!("MJPEG stream opened: {}", head.status_line);
    Ok(reader)
}

/// Blocking version of [`open_stream`].
pub fn open_stream_blocking(config: &StreamConfig) -> Result<std::io::BufReader<std::net::TcpStream>> {
    use std::io::Write;

    config.validate()?;
    tracing::info!("Opening MJPEG stream http://{}{}", config.address(), config.path);

    let mut stream = std::net::TcpStream::connect(config.address())?;
    stream.write_all(build_request(&config.host, &config.path).as_bytes())?;

    let mut reader = std::io::BufReader::with_capacity(config.chunk_size, stream);
    let head = skip_response_headers_blocking(&mut reader)?;

    tracing::info!("MJPEG stream opened: {}", head.status_line);
    Ok(reader)
}
