use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Request journal entry (JSONL)
// ---------------------------------------------------------------------------

/// How an API call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    ApiError,
    TransportError,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::ApiError => write!(f, "api-error"),
            Self::TransportError => write!(f, "transport-error"),
        }
    }
}

/// A single entry in the request journal (`~/.repcoach/request-log.jsonl`).
///
/// One entry per completed API call, written by the HTTP client and read
/// back by `repcoach history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub method: String,
    pub path: String,
    /// HTTP status, absent when no response arrived.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub outcome: Outcome,
    pub latency_ms: u64,
    /// Error message for failed calls.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl JournalEntry {
    pub fn now(method: &str, path: &str, outcome: Outcome, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            method: method.to_string(),
            path: path.to_string(),
            status: None,
            outcome,
            latency_ms,
            message: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Journal file
// ---------------------------------------------------------------------------

/// Append-only JSONL journal at a fixed path.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The journal in the user's home directory, if one can be resolved.
    pub fn default_location() -> Option<Self> {
        default_journal_path().map(Self::at)
    }

    /// The journal `[logging]` points at, whether or not logging is on.
    pub fn for_config(logging: &LoggingConfig) -> Option<Self> {
        match &logging.path {
            Some(path) => Some(Self::at(path)),
            None => Self::default_location(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Errors are swallowed: journaling never affects the
    /// call that produced the entry.
    pub fn record(&self, entry: &JournalEntry) {
        let _ = self.append(entry);
    }

    fn append(&self, entry: &JournalEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry, oldest first.
    ///
    /// Silently skips malformed lines. Returns an empty vec if the file does
    /// not exist or cannot be read.
    pub fn read_all(&self) -> Vec<JournalEntry> {
        let Ok(file) = fs::File::open(&self.path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .filter_map(Result::ok)
            .filter_map(|line| serde_json::from_str::<JournalEntry>(&line).ok())
            .collect()
    }

    /// The most recent `limit` entries, oldest first.
    pub fn read_recent(&self, limit: usize) -> Vec<JournalEntry> {
        let mut entries = self.read_all();
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        entries
    }
}

/// Return the path to the request journal file.
pub fn default_journal_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".repcoach").join("request-log.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_journal(name: &str) -> Journal {
        let path = std::env::temp_dir()
            .join(format!("repcoach-journal-{}-{name}", std::process::id()))
            .join("request-log.jsonl");
        let _ = fs::remove_file(&path);
        Journal::at(path)
    }

    #[test]
    fn appends_and_reads_back_in_order() {
        let journal = scratch_journal("order");
        journal.record(&JournalEntry::now("GET", "/profile", Outcome::Ok, 12).with_status(200));
        journal.record(
            &JournalEntry::now("GET", "/analytics?user_id=1", Outcome::ApiError, 30)
                .with_status(400)
                .with_message("Need at least 3 sessions"),
        );

        let entries = journal.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/profile");
        assert_eq!(entries[1].outcome, Outcome::ApiError);
        assert_eq!(entries[1].message.as_deref(), Some("Need at least 3 sessions"));
    }

    #[test]
    fn skips_malformed_lines() {
        let journal = scratch_journal("malformed");
        journal.record(&JournalEntry::now("GET", "/profile", Outcome::Ok, 1));
        let mut file = OpenOptions::new()
            .append(true)
            .open(journal.path())
            .unwrap();
        writeln!(file, "not json").unwrap();
        journal.record(&JournalEntry::now("PUT", "/profile", Outcome::TransportError, 2));

        let entries = journal.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].outcome, Outcome::TransportError);
        assert_eq!(entries[1].status, None);
    }

    #[test]
    fn skips_lines_that_are_not_utf8() {
        let journal = scratch_journal("binary");
        journal.record(&JournalEntry::now("GET", "/profile", Outcome::Ok, 1));
        let mut file = OpenOptions::new()
            .append(true)
            .open(journal.path())
            .unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        journal.record(&JournalEntry::now("GET", "/dashboard", Outcome::Ok, 3));

        let entries = journal.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].path, "/dashboard");
    }

    #[test]
    fn read_recent_keeps_the_tail() {
        let journal = scratch_journal("tail");
        for i in 0..5 {
            journal.record(&JournalEntry::now("GET", &format!("/p{i}"), Outcome::Ok, i));
        }

        let recent = journal.read_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].path, "/p3");
        assert_eq!(recent[1].path, "/p4");
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let journal = scratch_journal("missing");
        assert!(journal.read_all().is_empty());
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let entry = JournalEntry::now("POST", "/log-session", Outcome::TransportError, 5);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"outcome\":\"transport_error\""));
        assert!(!json.contains("\"status\""));
    }
}
