//! Flat-file log types and engine configuration.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Configuration ─────────────────────────────────────────────

/// Configuration for a [`LogFileEngine`](crate::LogFileEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFilesConfig {
    /// Directory holding the log files. Every operation is confined to it.
    pub log_dir: PathBuf,
    /// Recognized file extensions, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Bytes read per step when tailing backwards.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Markers wrapped around search hits.
    #[serde(default)]
    pub highlight: Highlight,
}

fn default_extensions() -> Vec<String> {
    vec!["log".to_string()]
}

fn default_chunk_size() -> usize {
    4096
}

impl LogFilesConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            extensions: default_extensions(),
            chunk_size: default_chunk_size(),
            highlight: Highlight::default(),
        }
    }

    /// Whether `name` carries one of the recognized extensions (case-insensitive).
    pub fn is_log_name(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Opening and closing markers for highlighted search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub open: String,
    pub close: String,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

// ── Results ───────────────────────────────────────────────────

/// One log file on disk, as seen at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileDescriptor {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// The last lines of a file, newest first, empty lines excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailResult {
    pub lines: Vec<String>,
}

impl TailResult {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A line matching a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// 1-based line number counted from the start of the file.
    pub line_number: usize,
    /// The line as read.
    pub content: String,
    /// The line with every occurrence of the term wrapped in highlight markers.
    pub highlighted: String,
}

/// Aggregate size of the log directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatistics {
    pub file_count: usize,
    pub total_bytes: u64,
    /// e.g. "1.5 MB".
    pub human_size: String,
}

/// What happened to a file passed to `delete_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete; the file did not exist.
    AlreadyGone,
}

impl DeleteOutcome {
    pub fn is_deleted(self) -> bool {
        self == Self::Deleted
    }
}
