//! Jetsam capture pipeline.
//!
//! This crate captures live post events from a Jetstream endpoint for a
//! bounded wall-clock duration and appends normalized records to a JSONL
//! capture log.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ JetstreamSource  │  WebSocket connection, recv loop + keepalive task
//! └────────┬─────────┘
//!          │  normalized posts
//!          ▼
//! ┌──────────────────┐
//! │ CaptureLogWriter │  Append-only JSONL, flushed per record
//! └──────────────────┘
//! ```
//!
//! The capture log is the durable checkpoint: indexing reads it back as its
//! sole input, so each accepted record is flushed as soon as it is written.

pub mod error;
pub mod log;
pub mod source;

pub use error::{Error, Result};
pub use log::{read_capture_log, CaptureLogWriter};
pub use source::{CaptureStats, JetstreamConfig, JetstreamSource};
