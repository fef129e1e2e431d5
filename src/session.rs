//! Session builder and read loop.
//!
//! The [`SessionBuilder`] provides a fluent API for configuring a session.
//! The [`StreamSession`] owns everything one stream needs and runs the loop:
//! 1. Read up to `chunk_size` bytes (zero bytes ends the session)
//! 2. Append them to the frame buffer
//! 3. Enforce the buffer ceiling, skipping extraction after an overflow
//! 4. Deliver every complete frame to the sink, in order
//!
//! The loop is available both as a blocking function over [`std::io::Read`]
//! and as an async function over [`tokio::io::AsyncRead`]. Either way it is a
//! single task: the sink is called synchronously and no new data is read
//! until it returns.
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::{protocol::build_frame, CollectSink, StreamSession};
//!
//! let mut wire = build_frame(b"one");
//! wire.extend(build_frame(b"two"));
//!
//! let mut session = StreamSession::builder().chunk_size(3).build().unwrap();
//! let mut sink = CollectSink::new();
//! let summary = session.run_blocking(&wire[..], &mut sink).unwrap();
//!
//! assert_eq!(summary.stats.frames_delivered, 2);
//! assert_eq!(sink.len(), 2);
//! ```

use std::io::{ErrorKind, Read};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::StreamConfig;
use crate::error::{MjpegError, Result};
use crate::protocol::{FrameBuffer, FrameExtractor, Overflow};
use crate::sink::FrameSink;
use crate::transport::open_stream;

/// Counters maintained by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Bytes received from the reader.
    pub bytes_read: u64,
    /// Non-empty reads performed.
    pub chunks_read: u64,
    /// Frames accepted by the sink.
    pub frames_delivered: u64,
    /// Times the buffer ceiling was exceeded.
    pub overflows: u64,
    /// Bytes thrown away by overflow recovery.
    pub bytes_discarded: u64,
}

/// Returned when the stream closes gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Counters at the time the stream closed.
    pub stats: SessionStats,
    /// Bytes of an incomplete frame dropped at close.
    pub residual_bytes: usize,
}

/// What happened to a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk was buffered and this many frames were delivered.
    Extracted(usize),
    /// The buffer overflowed and was cleared; nothing was delivered.
    Overflow(Overflow),
}

/// Builder for configuring and creating a [`StreamSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: StreamConfig,
}

impl SessionBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Set the stream host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the stream port.
    ///
    /// Default: 80
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the request path.
    ///
    /// Default: `/stream`
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the maximum bytes per read.
    ///
    /// Default: 8192
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the buffer ceiling.
    ///
    /// Default: 65536
    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.config.max_buffer_size = size;
        self
    }

    /// Validate the configuration and create the session.
    pub fn build(self) -> Result<StreamSession> {
        StreamSession::new(self.config)
    }
}

/// Buffer, extractor and counters; everything except the read scratch space.
#[derive(Debug)]
struct FrameState {
    buffer: FrameBuffer,
    extractor: FrameExtractor,
    stats: SessionStats,
    max_buffer_size: usize,
}

impl FrameState {
    fn ingest<S>(&mut self, chunk: &[u8], sink: &mut S) -> Result<ChunkOutcome>
    where
        S: FrameSink + ?Sized,
    {
        if !chunk.is_empty() {
            self.stats.bytes_read += chunk.len() as u64;
            self.stats.chunks_read += 1;
        }

        self.buffer.append(chunk);

        if let Some(overflow) = self.buffer.enforce_ceiling(self.max_buffer_size) {
            tracing::warn!(
                "Buffer overflow, discarded {} bytes (ceiling {})",
                overflow.discarded,
                overflow.ceiling
            );
            self.stats.overflows += 1;
            self.stats.bytes_discarded += overflow.discarded as u64;
            return Ok(ChunkOutcome::Overflow(overflow));
        }

        let before = self.extractor.delivered();
        let result = self.extractor.extract_all(&mut self.buffer, sink);
        // A failing sink still counts the frames it accepted before failing
        let accepted = (self.extractor.delivered() - before).saturating_sub(u64::from(result.is_err()));
        self.stats.frames_delivered += accepted;

        Ok(ChunkOutcome::Extracted(result?))
    }
}

/// One MJPEG stream: configuration, buffer, counters and the read loop.
///
/// The session exclusively owns its buffer; frames handed to a sink borrow
/// from it for the duration of the call.
#[derive(Debug)]
pub struct StreamSession {
    config: StreamConfig,
    state: FrameState,
    read_buf: Vec<u8>,
}

impl StreamSession {
    /// Create a new session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Create a session from a validated configuration.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;

        // Room for a full buffer plus the read that pushes it over
        let capacity = config.max_buffer_size + config.chunk_size;

        Ok(Self {
            state: FrameState {
                buffer: FrameBuffer::with_capacity(capacity),
                extractor: FrameExtractor::new(),
                stats: SessionStats::default(),
                max_buffer_size: config.max_buffer_size,
            },
            read_buf: vec![0u8; config.chunk_size],
            config,
        })
    }

    /// The session configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Counters so far.
    pub fn stats(&self) -> SessionStats {
        self.state.stats
    }

    /// Bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.state.buffer.len()
    }

    /// Process one chunk: append, enforce the ceiling, extract.
    ///
    /// This is the body of the read loop, exposed for callers that obtain
    /// bytes some other way.
    pub fn ingest<S>(&mut self, chunk: &[u8], sink: &mut S) -> Result<ChunkOutcome>
    where
        S: FrameSink + ?Sized,
    {
        self.state.ingest(chunk, sink)
    }

    /// Run the blocking read loop until the reader reports end of stream.
    ///
    /// # Errors
    ///
    /// Read failures are returned as [`MjpegError::Io`]; sink errors are
    /// returned unchanged. The buffer is cleared whenever the loop ends.
    pub fn run_blocking<R, S>(&mut self, mut reader: R, sink: &mut S) -> Result<SessionSummary>
    where
        R: Read,
        S: FrameSink + ?Sized,
    {
        tracing::info!("Stream session started");

        let result = loop {
            let n = match reader.read(&mut self.read_buf) {
                Ok(0) => break Ok(()), // Connection closed
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(MjpegError::Io(e)),
            };

            if let Err(e) = self.state.ingest(&self.read_buf[..n], sink) {
                break Err(e);
            }
        };

        self.finish(result)
    }

    /// Async version of [`run_blocking`](Self::run_blocking).
    ///
    /// The only await point is the read; sink calls are synchronous.
    pub async fn run<R, S>(&mut self, mut reader: R, sink: &mut S) -> Result<SessionSummary>
    where
        R: AsyncRead + Unpin,
        S: FrameSink + ?Sized,
    {
        tracing::info!("Stream session started");

        let result = loop {
            let n = match reader.read(&mut self.read_buf).await {
                Ok(0) => break Ok(()), // Connection closed
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(MjpegError::Io(e)),
            };

            if let Err(e) = self.state.ingest(&self.read_buf[..n], sink) {
                break Err(e);
            }
        };

        self.finish(result)
    }

    /// Open the configured HTTP stream and run the async loop on it.
    pub async fn connect_and_run<S>(&mut self, sink: &mut S) -> Result<SessionSummary>
    where
        S: FrameSink + ?Sized,
    {
        let reader = open_stream(&self.config).await?;
        self.run(reader, sink).await
    }

    /// Tear down after the loop ends, whatever the reason.
    fn finish(&mut self, result: Result<()>) -> Result<SessionSummary> {
        let residual_bytes = self.state.buffer.len();
        self.state.buffer.clear();

        match result {
            Ok(()) => {
                let stats = self.state.stats;
                tracing::info!(
                    "Connection closed after {} frames ({} bytes, {} overflows)",
                    stats.frames_delivered,
                    stats.bytes_read,
                    stats.overflows
                );
                Ok(SessionSummary {
                    stats,
                    residual_bytes,
                })
            }
            Err(e) => {
                tracing::warn!("Stream session ended: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, Frame};
    use crate::sink::CollectSink;

    /// Reader that returns scripted results, one per call.
    struct ScriptedReader {
        script: std::collections::VecDeque<std::io::Result<Vec<u8>>>,
    }

    impl ScriptedReader {
        fn new(script: Vec<std::io::Result<Vec<u8>>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.script.pop_front() {
                None => Ok(0),
                Some(Ok(bytes)) => {
                    assert!(bytes.len() <= buf.len(), "chunk larger than read size");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
            }
        }
    }

    #[test]
    fn test_builder_configuration() {
        let session = StreamSession::builder()
            .host("cam.local")
            .port(8080)
            .path("/video")
            .chunk_size(1024)
            .max_buffer_size(4096)
            .build()
            .unwrap();

        let config = session.config();
        assert_eq!(config.host, "cam.local");
        assert_eq!(config.port, 8080);
        assert_eq!(config.path, "/video");
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.max_buffer_size, 4096);
        assert_eq!(session.read_buf.len(), 1024);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        let err = StreamSession::builder().chunk_size(0).build().unwrap_err();
        assert!(matches!(err, MjpegError::Config(_)));
    }

    #[test]
    fn test_from_config() {
        let config = StreamConfig {
            chunk_size: 16,
            max_buffer_size: 64,
            ..Default::default()
        };
        let session = SessionBuilder::from_config(config.clone()).build().unwrap();
        assert_eq!(session.config(), &config);
    }

    #[test]
    fn test_ingest_outcomes() {
        let mut session = StreamSession::builder()
            .chunk_size(8)
            .max_buffer_size(16)
            .build()
            .unwrap();
        let mut sink = CollectSink::new();

        let frame = build_frame(b"ok");
        let outcome = session.ingest(&frame, &mut sink).unwrap();
        assert_eq!(outcome, ChunkOutcome::Extracted(1));

        let outcome = session.ingest(&[0u8; 17], &mut sink).unwrap();
        assert_eq!(
            outcome,
            ChunkOutcome::Overflow(Overflow {
                discarded: 17,
                ceiling: 16
            })
        );
        assert_eq!(session.buffered(), 0);

        let stats = session.stats();
        assert_eq!(stats.frames_delivered, 1);
        assert_eq!(stats.overflows, 1);
        assert_eq!(stats.bytes_discarded, 17);
        assert_eq!(stats.chunks_read, 2);
        assert_eq!(stats.bytes_read, 6 + 17);
    }

    #[test]
    fn test_empty_chunk_not_counted() {
        let mut session = StreamSession::new(StreamConfig::default()).unwrap();
        let mut sink = CollectSink::new();

        let outcome = session.ingest(&[], &mut sink).unwrap();
        assert_eq!(outcome, ChunkOutcome::Extracted(0));
        assert_eq!(session.stats().chunks_read, 0);
        assert_eq!(session.stats().bytes_read, 0);

        session.ingest(&build_frame(b"a"), &mut sink).unwrap();
        session.ingest(&[], &mut sink).unwrap();
        assert_eq!(session.stats().chunks_read, 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_overflow_skips_extraction() {
        let mut session = StreamSession::builder()
            .chunk_size(8)
            .max_buffer_size(8)
            .build()
            .unwrap();
        let mut sink = CollectSink::new();

        // Complete frame, but the chunk pushes the buffer over the ceiling
        session.ingest(&[0x00; 4], &mut sink).unwrap();
        let outcome = session.ingest(&build_frame(b"x"), &mut sink).unwrap();

        assert!(matches!(outcome, ChunkOutcome::Overflow(_)));
        assert!(sink.is_empty());
        assert_eq!(session.buffered(), 0);
    }

    #[test]
    fn test_run_blocking_delivers_in_order() {
        let first = build_frame(b"first");
        let second = build_frame(b"second");
        let mut wire = first.clone();
        wire.extend_from_slice(&second);
        wire.extend_from_slice(&[0xFF, 0xD8, 0x01]);

        let mut session = StreamSession::builder().chunk_size(5).build().unwrap();
        let mut sink = CollectSink::new();
        let summary = session.run_blocking(&wire[..], &mut sink).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(&sink.frames()[0][..], &first[..]);
        assert_eq!(&sink.frames()[1][..], &second[..]);
        assert_eq!(summary.stats.frames_delivered, 2);
        assert_eq!(summary.stats.bytes_read, wire.len() as u64);
        assert_eq!(summary.residual_bytes, 3);
        assert_eq!(session.buffered(), 0);
    }

    #[test]
    fn test_zero_length_read_terminates() {
        let mut session = StreamSession::builder().build().unwrap();
        let mut sink = CollectSink::new();
        let summary = session.run_blocking(std::io::empty(), &mut sink).unwrap();

        assert!(sink.is_empty());
        assert_eq!(summary.stats, SessionStats::default());
        assert_eq!(summary.residual_bytes, 0);
    }

    #[test]
    fn test_read_error_is_fatal() {
        let reader = ScriptedReader::new(vec![
            Ok(build_frame(b"a")),
            Ok(vec![0xFF, 0xD8, 0x00]),
            Err(std::io::Error::new(ErrorKind::ConnectionReset, "reset")),
            Ok(build_frame(b"never")),
        ]);

        let mut session = StreamSession::builder().build().unwrap();
        let mut sink = CollectSink::new();
        let err = session.run_blocking(reader, &mut sink).unwrap_err();

        assert!(matches!(err, MjpegError::Io(ref e) if e.kind() == ErrorKind::ConnectionReset));
        assert_eq!(sink.len(), 1);
        assert_eq!(session.buffered(), 0);
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let reader = ScriptedReader::new(vec![
            Err(std::io::Error::new(ErrorKind::Interrupted, "signal")),
            Ok(build_frame(b"after")),
        ]);

        let mut session = StreamSession::builder().build().unwrap();
        let mut sink = CollectSink::new();
        let summary = session.run_blocking(reader, &mut sink).unwrap();

        assert_eq!(summary.stats.frames_delivered, 1);
    }

    #[test]
    fn test_sink_error_ends_session() {
        let mut wire = build_frame(b"one");
        wire.extend(build_frame(b"two"));
        wire.extend(build_frame(b"three"));

        let mut session = StreamSession::builder().build().unwrap();
        let mut seen = 0;
        let mut sink = |frame: Frame<'_>| -> Result<()> {
            seen += 1;
            if frame.sequence() == 1 {
                return Err(MjpegError::Sink("display gone".into()));
            }
            Ok(())
        };

        let err = session.run_blocking(&wire[..], &mut sink).unwrap_err();
        assert!(matches!(err, MjpegError::Sink(_)));
        assert_eq!(seen, 2);
        assert_eq!(session.stats().frames_delivered, 1);
        assert_eq!(session.buffered(), 0);
    }

    #[tokio::test]
    async fn test_run_async() {
        let (mut client, server) = tokio::io::duplex(64);
        let first = build_frame(&[0x11; 40]);
        let second = build_frame(&[0x22; 40]);

        let writer = {
            let first = first.clone();
            let second = second.clone();
            tokio::spawn(async move {
                use tokio::io::AsyncWriteExt;
                client.write_all(&first).await.unwrap();
                client.write_all(&second).await.unwrap();
                // Dropping the client closes the stream
            })
        };

        let mut session = StreamSession::builder().chunk_size(16).build().unwrap();
        let mut sink = CollectSink::new();
        let summary = session.run(server, &mut sink).await.unwrap();
        writer.await.unwrap();

        assert_eq!(summary.stats.frames_delivered, 2);
        assert_eq!(&sink.frames()[0][..], &first[..]);
        assert_eq!(&sink.frames()[1][..], &second[..]);
    }

    /// Hands out one burst of data, then fails like a reset connection.
    struct ResetAfter {
        data: Option<Vec<u8>>,
    }

    impl tokio::io::AsyncRead for ResetAfter {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    std::task::Poll::Ready(Ok(()))
                }
                None => std::task::Poll::Ready(Err(std::io::Error::new(
                    ErrorKind::ConnectionReset,
                    "reset",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn test_run_async_read_error_is_fatal() {
        let mut data = build_frame(b"a");
        data.extend_from_slice(&[0xFF, 0xD8, 0x00]);
        let reader = ResetAfter { data: Some(data) };

        let mut session = StreamSession::builder().chunk_size(64).build().unwrap();
        let mut sink = CollectSink::new();
        let err = session.run(reader, &mut sink).await.unwrap_err();

        match err {
            MjpegError::Io(e) => assert_eq!(e.kind(), ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(sink.len(), 1);
        assert_eq!(session.stats().chunks_read, 1);
        assert_eq!(session.buffered(), 0);
    }
}
