//! Ranked topic queries over reconstructed threads.
//!
//! A topic query runs a full-text match, groups matching rows by thread root,
//! ranks roots by match count, and returns the *complete* thread for each
//! selected root. The optional language filter narrows which threads get
//! selected; it never narrows which posts of a selected thread are returned.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::Result;

/// One stored post, as returned by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPost {
    pub uri: String,
    pub text: String,
    pub author: String,
    pub lang: Option<String>,
    pub created_at: String,
    pub reply_to: Option<String>,
    pub root_uri: String,
}

/// A reconstructed thread: all posts sharing one root, ordered by
/// `created_at` ascending.
pub type Thread = Vec<ThreadPost>;

/// Find the threads most engaged with a topic.
///
/// Matching rows are grouped by `root_uri`; the top `limit` roots by
/// descending match count are selected (ties fall back to the store's row
/// order), and every post of each selected thread is returned regardless of
/// language or whether it matched.
///
/// An empty or whitespace-only topic returns an empty result, not an error,
/// as does a topic with no matches.
pub fn threads_by_topic(
    conn: &Connection,
    topic: &str,
    limit: usize,
    preferred_langs: Option<&[String]>,
) -> Result<Vec<Thread>> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Ok(Vec::new());
    }

    let mut params: Vec<Value> = vec![Value::from(topic.to_string())];
    let lang_clause = match preferred_langs {
        Some(langs) if !langs.is_empty() => {
            let placeholders = vec!["?"; langs.len()].join(",");
            for lang in langs {
                params.push(Value::from(lang.to_lowercase()));
            }
            format!(" AND p.lang IN ({placeholders})")
        }
        _ => String::new(),
    };
    params.push(Value::from(limit as i64));

    let sql = format!(
        "WITH matches AS (
           SELECT p.root_uri, COUNT(*) AS hits
           FROM posts_fts f
           JOIN posts p ON p.id = f.rowid
           WHERE posts_fts MATCH ?
           {lang_clause}
           GROUP BY p.root_uri
           ORDER BY hits DESC
           LIMIT ?
         )
         SELECT p.uri, p.text, p.author, p.lang, p.created_at, p.reply_to, p.root_uri
         FROM posts p
         JOIN matches m ON m.root_uri = p.root_uri
         ORDER BY m.hits DESC, p.root_uri, p.created_at"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), |row| {
        Ok(ThreadPost {
            uri: row.get(0)?,
            text: row.get(1)?,
            author: row.get(2)?,
            lang: row.get(3)?,
            created_at: row.get(4)?,
            reply_to: row.get(5)?,
            root_uri: row.get(6)?,
        })
    })?;

    // Rows arrive sorted by (rank, root, created_at); fold runs of equal
    // root_uri into threads, preserving rank order.
    let mut threads: Vec<Thread> = Vec::new();
    for row in rows {
        let post = row?;
        match threads.last_mut() {
            Some(thread) if thread[0].root_uri == post.root_uri => thread.push(post),
            _ => threads.push(vec![post]),
        }
    }

    Ok(threads)
}

/// Topic query returning rendered thread transcripts.
///
/// Each transcript is the thread's posts rendered as timestamped
/// `[created_at] author: text` lines joined by newlines. This is the
/// interface the conversational agent layer consumes.
pub fn filter_threads_by_topic(
    conn: &Connection,
    topic: &str,
    limit: usize,
    preferred_langs: Option<&[String]>,
) -> Result<Vec<String>> {
    let threads = threads_by_topic(conn, topic, limit, preferred_langs)?;
    Ok(threads.iter().map(|t| render_transcript(t)).collect())
}

fn render_transcript(thread: &Thread) -> String {
    thread
        .iter()
        .map(|post| {
            let ts = post
                .created_at
                .get(..19)
                .unwrap_or(&post.created_at)
                .replace('T', " ");
            let author = if post.author.is_empty() {
                "unknown"
            } else {
                &post.author
            };
            let text = post.text.replace('\n', " ");
            format!("[{ts}] {author}: {text}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
