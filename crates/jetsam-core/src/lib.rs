//! Core types and shared utilities for the Jetsam capture pipeline.
//!
//! This crate provides:
//! - The [`Post`] record, the atomic unit flowing through capture and indexing
//! - Normalization of raw Jetstream commit messages into posts

mod post;
pub mod record;

/// The record collection we capture. Everything else on the stream is ignored.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

pub use post::Post;
pub use record::normalize;
