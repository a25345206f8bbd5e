//! SQLite schema for the indexed post store.
//!
//! One row per post plus a contentless FTS5 index over `text` and `author`,
//! keyed by the posts table rowid. The FTS table uses the porter stemming
//! tokenizer so "posting" matches a query for "post"; quoted phrases match
//! exact contiguous sequences.

use rusqlite::{Connection, Result};

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
///
/// Creates all tables if they don't exist and runs any pending migrations.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        migrate(conn, current_version, SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Get the current schema version (0 if not initialized).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;
    Ok(())
}

/// Create all tables for a fresh database.
fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per captured post; uri uniqueness makes re-insertion a no-op
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            uri TEXT UNIQUE,
            text TEXT,
            author TEXT,
            lang TEXT,
            created_at TEXT,
            reply_to TEXT,
            root_uri TEXT
        );

        -- Contentless full-text index over text and author, porter-stemmed
        CREATE VIRTUAL TABLE IF NOT EXISTS posts_fts
        USING fts5(text, author, uri UNINDEXED, content='', tokenize='porter');

        CREATE INDEX IF NOT EXISTS idx_posts_root_uri ON posts(root_uri);
        CREATE INDEX IF NOT EXISTS idx_posts_lang ON posts(lang);
        CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author);
        "#,
    )?;

    Ok(())
}

/// Run migrations from one version to another.
///
/// No migrations exist yet; this is the hook for future schema versions.
fn migrate(conn: &Connection, _from: i32, to: i32) -> Result<()> {
    set_schema_version(conn, to)
}
