//! Normalization of raw Jetstream messages into [`Post`] records.
//!
//! The Jetstream endpoint delivers one JSON object per WebSocket text frame.
//! Messages carrying a `commit` for the tracked post collection are turned
//! into normalized [`Post`] rows; everything else (account events, identity
//! events, deletes, other collections, undecodable frames) is rejected.
//!
//! Rejection is not an error: capture is lossy-by-design for irrelevant
//! traffic, so the normalizer returns `Option` rather than `Result`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Post, POST_COLLECTION};

/// Jetstream message envelope. Only the fields we consume are modeled;
/// unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct JetstreamEvent {
    did: Option<String>,
    commit: Option<Commit>,
}

#[derive(Debug, Deserialize)]
struct Commit {
    collection: Option<String>,
    operation: Option<String>,
    rkey: Option<String>,
    record: Option<PostRecord>,
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    text: Option<String>,
    langs: Option<Vec<String>>,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    reply: Option<ReplyRef>,
}

#[derive(Debug, Deserialize)]
struct ReplyRef {
    parent: Option<ParentRef>,
}

#[derive(Debug, Deserialize)]
struct ParentRef {
    uri: Option<String>,
}

/// Normalize one raw Jetstream message into a [`Post`].
///
/// Returns `None` when the message is not a content-creation event for the
/// tracked post collection, lacks textual content, or lacks the fields needed
/// to form a stable identifier (author DID, record key). Structurally invalid
/// JSON is treated the same way.
///
/// The ambient clock is only consulted for the `created_at` fallback; see
/// [`normalize_at`] for the deterministic form used in tests.
pub fn normalize(raw: &str) -> Option<Post> {
    normalize_at(raw, Utc::now())
}

/// Deterministic normalization with an explicit fallback timestamp.
pub fn normalize_at(raw: &str, now: DateTime<Utc>) -> Option<Post> {
    let msg: JetstreamEvent = serde_json::from_str(raw).ok()?;

    let commit = msg.commit?;
    if commit.collection.as_deref() != Some(POST_COLLECTION) {
        return None;
    }
    if !matches!(commit.operation.as_deref(), Some("create") | Some("update")) {
        return None;
    }

    let did = msg.did.filter(|d| !d.is_empty())?;
    let rkey = commit.rkey.filter(|k| !k.is_empty())?;
    let record = commit.record?;
    let text = record.text?;

    let lang = record
        .langs
        .and_then(|langs| langs.into_iter().next())
        .map(|l| l.to_lowercase());

    let created_at = record
        .created_at
        .unwrap_or_else(|| now.to_rfc3339());

    let reply_to = record.reply.and_then(|r| r.parent).and_then(|p| p.uri);

    Some(Post {
        uri: format!("at://{did}/{POST_COLLECTION}/{rkey}"),
        text,
        author: did,
        lang,
        created_at,
        reply_to,
    })
}
