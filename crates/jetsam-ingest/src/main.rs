//! Jetsam capture daemon.
//!
//! Connects to a Jetstream endpoint, captures post events for a bounded
//! duration, and writes normalized records to a JSONL capture log.
//!
//! ```bash
//! # Capture 30 seconds of posts to the default log
//! jetsam-ingest
//!
//! # Custom duration and output path
//! jetsam-ingest --duration 120 --out /data/capture.jsonl
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jetsam_ingest::{CaptureLogWriter, JetstreamConfig, JetstreamSource};
use tracing_subscriber::EnvFilter;

/// Jetsam capture daemon.
#[derive(Parser, Debug)]
#[command(name = "jetsam-ingest")]
#[command(about = "Bounded-duration Jetstream post capture")]
#[command(version)]
struct Args {
    /// Capture duration in seconds
    #[arg(long, default_value = "30")]
    duration: u64,

    /// Output capture log path
    #[arg(long, short, default_value = "./firehose_capture.jsonl")]
    out: PathBuf,

    /// Jetstream WebSocket endpoint (overrides the default public endpoint)
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse()?)
                .add_directive("jetsam_ingest=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = JetstreamConfig {
        capture_duration: Duration::from_secs(args.duration),
        ..Default::default()
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    let mut writer = CaptureLogWriter::create(&args.out)
        .with_context(|| format!("failed to create capture log at {}", args.out.display()))?;

    let source = JetstreamSource::new(config);
    let stats = source
        .run_async(|post| {
            writer.append(&post)?;
            Ok(true)
        })
        .await
        .context("capture run failed")?;

    tracing::info!(
        path = %args.out.display(),
        posts = stats.accepted_posts,
        rejected = stats.rejected_messages,
        "capture log written"
    );

    Ok(())
}
