//! Stream configuration.
//!
//! All fields have defaults matching a typical camera access point, so an
//! empty JSON object is a valid configuration.
//!
//! # Example
//!
//! ```
//! use mjpeg_frames::StreamConfig;
//!
//! let config = StreamConfig::from_json_str(r#"{ "host": "10.0.0.7", "port": 8080 }"#).unwrap();
//! assert_eq!(config.host, "10.0.0.7");
//! assert_eq!(config.path, "/stream");
//! assert_eq!(config.chunk_size, 8192);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MjpegError, Result};
use crate::protocol::DEFAULT_MAX_BUFFER_SIZE;

/// Default size of a single read from the connection.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Default stream server address.
pub const DEFAULT_HOST: &str = "192.168.4.1";

/// Default stream server port.
pub const DEFAULT_PORT: u16 = 80;

/// Default HTTP path of the MJPEG stream.
pub const DEFAULT_PATH: &str = "/stream";

/// Settings for opening and framing one MJPEG stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Stream server host name or address.
    pub host: String,
    /// Stream server port.
    pub port: u16,
    /// Request path.
    pub path: String,
    /// Maximum bytes requested per read.
    pub chunk_size: usize,
    /// Buffer ceiling; exceeding it discards all buffered bytes.
    pub max_buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl StreamConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// `host:port` pair for connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check that the values can drive a session.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MjpegError::Config("host must not be empty".into()));
        }
        if !self.path.starts_with('/') {
            return Err(MjpegError::Config(format!(
                "path must start with '/': {:?}",
                self.path
            )));
        }
        if self.chunk_size == 0 {
            return Err(MjpegError::Config("chunk_size must be positive".into()));
        }
        if self.max_buffer_size < self.chunk_size {
            return Err(MjpegError::Config(format!(
                "max_buffer_size {} is smaller than chunk_size {}",
                self.max_buffer_size, self.chunk_size
            )));
        }
        Ok(())
    }
}
