//! Jetsam indexer.
//!
//! Rebuilds the indexed store from a capture log and optionally runs one
//! topic query, printing rendered thread transcripts.
//!
//! ```bash
//! # Rebuild the index from a capture log
//! jetsam-index --capture ./firehose_capture.jsonl
//!
//! # Rebuild and query
//! jetsam-index --capture ./firehose_capture.jsonl --topic "rust" --langs en,fr
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jetsam_index::{filter_threads_by_topic, Store};
use tracing_subscriber::EnvFilter;

/// Jetsam indexer.
#[derive(Parser, Debug)]
#[command(name = "jetsam-index")]
#[command(about = "Rebuild the thread index from a capture log")]
#[command(version)]
struct Args {
    /// Capture log to index
    #[arg(long, default_value = "./firehose_capture.jsonl")]
    capture: PathBuf,

    /// SQLite database path
    #[arg(long, default_value = "./data/firehose.db")]
    db: PathBuf,

    /// Topic to query after indexing (omit to only rebuild)
    #[arg(long)]
    topic: Option<String>,

    /// Maximum number of threads to return
    #[arg(long, default_value = "10")]
    limit: usize,

    /// Preferred language codes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    langs: Option<Vec<String>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse()?)
                .add_directive("jetsam_index=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut store = Store::open(&args.db)
        .with_context(|| format!("failed to open store at {}", args.db.display()))?;

    let count = store
        .rebuild_from_log(&args.capture)
        .with_context(|| format!("failed to index {}", args.capture.display()))?;
    tracing::info!(posts = count, db = %args.db.display(), "index rebuilt");

    if let Some(topic) = args.topic {
        let transcripts = filter_threads_by_topic(
            store.connection(),
            &topic,
            args.limit,
            args.langs.as_deref(),
        )
        .context("topic query failed")?;

        if transcripts.is_empty() {
            println!("no threads matched '{topic}'");
        }
        for (i, transcript) in transcripts.iter().enumerate() {
            println!("--- thread {} ---", i + 1);
            println!("{transcript}\n");
        }
    }

    Ok(())
}
