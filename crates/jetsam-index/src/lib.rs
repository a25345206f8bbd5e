//! Thread reconstruction and topic search over a capture log.
//!
//! This crate rebuilds the indexed store from a capture log and serves
//! ranked, language-filterable topic queries over reconstructed threads.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Capture Log  │  JSONL, one normalized post per line
//! └──────┬───────┘
//!        │  full batch, every run
//!        ▼
//! ┌──────────────┐
//! │   resolve    │  reply-chain root resolution (memoized, cycle-safe)
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    Store     │  SQLite posts table + FTS5 index, transactional rebuild
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │    query     │  ranked topic search returning complete threads
//! └──────────────┘
//! ```
//!
//! Indexing is destructive-and-rebuild: each run clears all rows and
//! repopulates from the current capture log inside one transaction, so
//! `root_uri` is always consistent with the full log and readers never see a
//! partially rebuilt store.

pub mod error;
pub mod query;
pub mod resolve;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use query::{filter_threads_by_topic, threads_by_topic, Thread, ThreadPost};
pub use resolve::{build_parent_map, resolve_root};
pub use store::Store;
