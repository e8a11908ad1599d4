//! Append-only log of processed transcripts.
//!
//! Records are stored as newline-delimited JSON (JSONL) in
//! `<home>/runs.jsonl`. Appends take an exclusive file lock so that two
//! processes never interleave lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::RunRecord;

/// File-based run log using JSONL format
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<home>/runs.jsonl`
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::config::home_dir()?.join("runs.jsonl"))
    }

    /// Open the log at its default location
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record under an exclusive lock
    pub async fn append(&self, record: &RunRecord) -> Result<()> {
        let json = serde_json::to_string(record).context("Failed to serialize run record")?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || append_line(&path, &json))
            .await
            .context("Run log writer task panicked")?
    }

    /// All records in the order they were written
    pub async fn replay(&self) -> Result<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .await
            .with_context(|| format!("Failed to open run log: {}", self.path.display()))?;

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut records = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let record: RunRecord = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse run record: {}", line))?;
            records.push(record);
        }

        Ok(records)
    }

    /// The most recent `limit` records, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut records = self.replay().await?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

fn append_line(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open run log: {}", path.display()))?;

    file.lock_exclusive()
        .context("Failed to acquire file lock on runs.jsonl")?;

    writeln!(file, "{}", json).context("Failed to write run record")?;
    file.flush().context("Failed to flush run record")?;

    // Lock is released when file is dropped
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn failed(transcript: &str) -> RunRecord {
        RunRecord::failed(transcript, &anyhow::anyhow!("engine down"))
    }

    #[tokio::test]
    async fn test_missing_log_replays_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = RunLog::new(temp_dir.path().join("runs.jsonl"));
        assert!(log.replay().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_creates_parent_and_recent_is_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let log = RunLog::new(temp_dir.path().join("nested").join("runs.jsonl"));

        for transcript in ["first", "second", "third"] {
            log.append(&failed(transcript)).await.unwrap();
        }

        let recent = log.recent(2).await.unwrap();
        let transcripts: Vec<&str> = recent.iter().map(|r| r.transcript.as_str()).collect();
        assert_eq!(transcripts, vec!["third", "second"]);
        assert!(!recent[0].is_success());
        assert_eq!(recent[0].error.as_deref(), Some("engine down"));
    }
}
