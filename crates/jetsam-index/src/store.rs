//! The persisted post store.
//!
//! Owns the SQLite connection and performs the destructive-and-rebuild
//! indexing pass: every run clears all rows and full-text entries, resolves
//! thread roots for the whole capture log, and repopulates both tables inside
//! a single transaction. From a reader's perspective the rebuild is atomic;
//! a failure mid-rebuild rolls back to the prior state.

use std::collections::HashMap;
use std::path::Path;

use jetsam_core::Post;
use rusqlite::Connection;

use crate::resolve::{build_parent_map, resolve_root};
use crate::schema;
use crate::Result;

/// SQLite-backed post store with a paired full-text index.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::init_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// The underlying connection, for the read-only query layer.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Rebuild the store from the full set of captured posts.
    ///
    /// Clears all existing rows and full-text entries, resolves `root_uri`
    /// for every post with a fresh memo, and bulk-inserts posts plus their
    /// full-text entries. Duplicate `uri`s within the batch are no-ops, not
    /// errors. Returns the final row count.
    pub fn rebuild(&mut self, posts: &[Post]) -> Result<usize> {
        let parents = build_parent_map(posts);
        let mut memo: HashMap<String, String> = HashMap::new();

        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM posts", [])?;
        tx.execute("INSERT INTO posts_fts(posts_fts) VALUES('delete-all')", [])?;

        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO posts (uri, text, author, lang, created_at, reply_to, root_uri)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;

            for post in posts {
                let root = resolve_root(&post.uri, &parents, &mut memo);
                insert.execute(rusqlite::params![
                    post.uri,
                    post.text,
                    post.author,
                    post.lang,
                    post.created_at,
                    post.reply_to,
                    root,
                ])?;
            }
        }

        // Contentless FTS: populate from the surviving rows so rowids line up.
        tx.execute(
            "INSERT INTO posts_fts (rowid, text, author, uri)
             SELECT id, text, author, uri FROM posts",
            [],
        )?;

        let count: usize =
            tx.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

        tx.commit()?;

        metrics::gauge!("index_posts").set(count as f64);
        tracing::info!(posts = count, "index rebuilt");

        Ok(count)
    }

    /// Read a capture log and rebuild the store from it.
    pub fn rebuild_from_log<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let posts = jetsam_ingest::read_capture_log(path)?;
        self.rebuild(&posts)
    }
}
