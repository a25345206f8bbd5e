//! The capture log: an append-only JSONL file of normalized posts.
//!
//! One serde-encoded [`Post`] per line. The log is the durable checkpoint
//! between capture and indexing, so every record is flushed as soon as it is
//! appended; a crash mid-capture loses at most the frame in flight, never a
//! partially written record that was already accepted.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use jetsam_core::Post;

use crate::Result;

/// Append-only writer for one capture session.
pub struct CaptureLogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    records_written: usize,
}

impl CaptureLogWriter {
    /// Create (truncating) the capture log at the given path.
    ///
    /// Parent directories are created if missing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Append one post and flush it to disk.
    pub fn append(&mut self, post: &Post) -> Result<()> {
        let line = serde_json::to_string(post)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a capture log back into memory.
///
/// Blank lines, undecodable lines, and records with an empty `uri` are
/// skipped with a warning; a damaged line never fails the whole batch.
pub fn read_capture_log<P: AsRef<Path>>(path: P) -> Result<Vec<Post>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut posts = Vec::new();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let post: Post = match serde_json::from_str(&line) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("line {}: skipping undecodable record: {}", line_num + 1, e);
                continue;
            }
        };

        if post.uri.is_empty() {
            tracing::warn!("line {}: skipping record with empty uri", line_num + 1);
            continue;
        }

        posts.push(post);
    }

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(uri: &str) -> Post {
        Post {
            uri: uri.to_string(),
            text: "hello".to_string(),
            author: "did:plc:alice".to_string(),
            lang: Some("en".to_string()),
            created_at: "2025-06-01T12:00:00Z".to_string(),
            reply_to: None,
        }
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");

        let mut writer = CaptureLogWriter::create(&path).unwrap();
        writer.append(&post("at://a/app.bsky.feed.post/1")).unwrap();
        writer.append(&post("at://a/app.bsky.feed.post/2")).unwrap();
        assert_eq!(writer.records_written(), 2);
        drop(writer);

        let posts = read_capture_log(&path).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].uri, "at://a/app.bsky.feed.post/1");
        assert_eq!(posts[1].uri, "at://a/app.bsky.feed.post/2");
    }

    #[test]
    fn skips_damaged_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");

        let mut writer = CaptureLogWriter::create(&path).unwrap();
        writer.append(&post("at://a/app.bsky.feed.post/1")).unwrap();
        drop(writer);

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{{truncated garbage").unwrap();
        writeln!(
            file,
            r#"{{"uri":"","text":"","author":"","lang":null,"created_at":"","reply_to":null}}"#
        )
        .unwrap();
        drop(file);

        let posts = read_capture_log(&path).unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/capture.jsonl");
        let writer = CaptureLogWriter::create(&path).unwrap();
        assert!(writer.path().exists());
    }
}
