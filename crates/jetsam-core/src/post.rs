//! The normalized post record.

use serde::{Deserialize, Serialize};

/// One captured content-creation event, as written to the capture log.
///
/// `uri` is globally unique (`at://<did>/app.bsky.feed.post/<rkey>`) and is
/// the identity used for deduplication and reply-chain resolution. `reply_to`
/// holds the immediate parent's uri when the post is a reply; the thread root
/// (`root_uri`) is computed at indexing time, not captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique at-uri identifying this post.
    pub uri: String,

    /// Post text. May be empty, but always present.
    pub text: String,

    /// Author identity (DID).
    pub author: String,

    /// Normalized (lowercase) language tag, when the record declared one.
    pub lang: Option<String>,

    /// ISO-8601 creation timestamp. Used for ordering within a thread.
    pub created_at: String,

    /// at-uri of the immediate parent post, when this is a reply.
    pub reply_to: Option<String>,
}
