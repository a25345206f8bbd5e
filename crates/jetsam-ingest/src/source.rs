//! Live Jetstream event source.
//!
//! Opens one WebSocket connection to a Jetstream endpoint and streams commit
//! messages for a bounded wall-clock duration. Two concurrent activities run
//! during capture:
//!
//! - the receive loop, which waits for the next frame with a short timeout so
//!   it can re-check the deadline without blocking indefinitely, and
//! - a keepalive task owning the write half of the socket, which sends a ping
//!   on a fixed interval and terminates silently if the ping fails (the
//!   receive loop's own read failures surface a dead connection).
//!
//! Capture ends strictly on the wall-clock deadline, never on message count,
//! so a run's execution time is predictable regardless of stream volume.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use jetsam_core::{record, Post};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::Result;

/// Configuration for the Jetstream source.
#[derive(Debug, Clone)]
pub struct JetstreamConfig {
    /// WebSocket endpoint URL, including the collection filter query.
    pub endpoint: String,

    /// Wall-clock capture duration. Clamped to at least one second.
    pub capture_duration: Duration,

    /// Per-frame receive timeout. A timeout re-checks the deadline and
    /// continues; it is not an error.
    pub recv_timeout: Duration,

    /// Interval between liveness pings.
    pub ping_interval: Duration,
}

impl Default for JetstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "wss://jetstream2.us-east.bsky.network/subscribe?wantedCollections=app.bsky.feed.post"
                .to_string(),
            capture_duration: Duration::from_secs(30),
            recv_timeout: Duration::from_secs(2),
            ping_interval: Duration::from_secs(15),
        }
    }
}

/// Statistics from one capture run.
#[derive(Debug, Clone, Default)]
pub struct CaptureStats {
    /// Frames received from the stream (before normalization).
    pub total_messages: usize,

    /// Messages normalized into posts and handed to the sink.
    pub accepted_posts: usize,

    /// Messages rejected by the normalizer or undecodable frames.
    pub rejected_messages: usize,
}

/// Live Jetstream event source.
pub struct JetstreamSource {
    config: JetstreamConfig,
}

impl JetstreamSource {
    /// Create a new source with the given configuration.
    pub fn new(config: JetstreamConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &JetstreamConfig {
        &self.config
    }

    /// Capture from the stream until the deadline, calling the handler for
    /// each normalized post.
    ///
    /// The handler returns `Ok(true)` to continue, `Ok(false)` to stop the
    /// run early, or `Err` to abort with an error. Malformed frames and
    /// non-post messages are counted and dropped, never fatal.
    pub async fn run_async<F>(&self, mut handler: F) -> Result<CaptureStats>
    where
        F: FnMut(Post) -> Result<bool>,
    {
        let duration = self.config.capture_duration.max(Duration::from_secs(1));

        tracing::info!(
            endpoint = %self.config.endpoint,
            duration_secs = duration.as_secs(),
            "connecting to jetstream"
        );

        let (ws, _response) = connect_async(self.config.endpoint.as_str()).await?;
        let (mut write, mut read) = ws.split();

        // Keepalive task: owns the write half, pings on a fixed interval.
        // A failed ping means the connection is dead; the task just returns
        // and lets the receive loop discover the failure on its next read.
        let ping_interval = self.config.ping_interval;
        let keepalive = tokio::spawn(async move {
            loop {
                tokio::time::sleep(ping_interval).await;
                if write.send(Message::Ping(Vec::new())).await.is_err() {
                    return;
                }
            }
        });

        let mut stats = CaptureStats::default();
        let deadline = Instant::now() + duration;

        while Instant::now() < deadline {
            let frame = match tokio::time::timeout(self.config.recv_timeout, read.next()).await {
                // Timeout: re-check the deadline and keep waiting.
                Err(_) => continue,
                Ok(None) => {
                    tracing::warn!("stream closed by remote end");
                    break;
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!("read error, ending capture: {}", e);
                    break;
                }
                Ok(Some(Ok(frame))) => frame,
            };

            let raw = match frame {
                Message::Text(text) => text,
                Message::Close(_) => {
                    tracing::info!("close frame received");
                    break;
                }
                // Pings are answered by the protocol layer; pongs and binary
                // frames carry nothing we index.
                _ => continue,
            };

            stats.total_messages += 1;
            metrics::counter!("capture_messages_total").increment(1);

            let Some(post) = record::normalize(&raw) else {
                stats.rejected_messages += 1;
                metrics::counter!("capture_rejected_total").increment(1);
                continue;
            };

            stats.accepted_posts += 1;
            metrics::counter!("capture_posts_total").increment(1);

            match handler(post) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("handler signaled stop");
                    break;
                }
                Err(e) => {
                    keepalive.abort();
                    return Err(e);
                }
            }
        }

        // Cancel the keepalive before releasing the connection.
        keepalive.abort();
        let _ = keepalive.await;

        tracing::info!(
            total = stats.total_messages,
            accepted = stats.accepted_posts,
            rejected = stats.rejected_messages,
            "capture finished"
        );

        Ok(stats)
    }
}
