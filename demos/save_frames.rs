//! Save Frames - connect to an MJPEG stream and write every frame to disk.
//!
//! This example demonstrates:
//! - Loading a `StreamConfig` from an optional JSON file
//! - Running a session against a live HTTP stream
//! - Writing frames with `DirectorySink`
//!
//! # Running
//!
//! ```text
//! cargo run --example save_frames -- [config.json] [output-dir]
//! RUST_LOG=mjpeg_frames=debug cargo run --example save_frames
//! ```
//!
//! Example `config.json`:
//!
//! ```json
//! { "host": "192.168.4.1", "port": 80, "path": "/stream" }
//! ```

use mjpeg_frames::{DirectorySink, StreamConfig, StreamSession};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => StreamConfig::from_json_file(path)?,
        None => StreamConfig::default(),
    };
    let out_dir = args.next().unwrap_or_else(|| "frames".to_string());

    let mut session = StreamSession::new(config)?;
    let mut sink = DirectorySink::create(&out_dir)?;

    match session.connect_and_run(&mut sink).await {
        Ok(summary) => {
            tracing::info!(
                "Saved {} frames to {} ({} overflows)",
                sink.written(),
                out_dir,
                summary.stats.overflows
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Stream failed after {} frames: {}", sink.written(), e);
            Err(e.into())
        }
    }
}
