//! The flat-file log engine: every operation is confined to one directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{LogError, LogResult};
use crate::fs::{FileSystemLogFs, LogFs};
use crate::search::{Matcher, search_lines};
use crate::stats::summarize;
use crate::tail::tail_lines;
use crate::types::{
    DeleteOutcome, FileStatistics, LogFileDescriptor, LogFilesConfig, SearchMatch, TailResult,
};

/// Lists, tails, searches and deletes log files inside `config.log_dir`.
///
/// File names passed by callers are reduced to their final path
/// component before use, so `"../../etc/passwd.log"` refers to
/// `<log_dir>/passwd.log`. Only names with a recognized extension are
/// accepted, so every operation sees the same files `list_files` shows.
pub struct LogFileEngine {
    config: LogFilesConfig,
    fs: Arc<dyn LogFs>,
}

impl LogFileEngine {
    pub fn new(config: LogFilesConfig, fs: Arc<dyn LogFs>) -> Self {
        Self { config, fs }
    }

    /// Engine backed by the local filesystem.
    pub fn local(config: LogFilesConfig) -> Self {
        Self::new(config, Arc::new(FileSystemLogFs))
    }

    pub fn config(&self) -> &LogFilesConfig {
        &self.config
    }

    /// Resolve a caller-supplied name to a log file path inside the log directory.
    pub fn resolve(&self, name: &str) -> LogResult<PathBuf> {
        let base = base_name(name)?;
        if !self.config.is_log_name(base) {
            return Err(LogError::Validation(format!("not a log file: '{base}'")));
        }
        Ok(self.config.log_dir.join(base))
    }

    /// Log files in the directory, newest first.
    ///
    /// A missing or unreadable directory yields an empty list.
    pub async fn list_files(&self) -> Vec<LogFileDescriptor> {
        let dir = &self.config.log_dir;
        let names = match self.fs.list_dir(dir).await {
            Ok(names) => names,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "log directory does not exist");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "log directory unreadable");
                return Vec::new();
            }
        };

        let mut files = Vec::with_capacity(names.len());
        for name in names {
            if !self.config.is_log_name(&name) {
                continue;
            }
            match self.fs.metadata(&dir.join(&name)).await {
                Ok(meta) if meta.is_file => files.push(LogFileDescriptor {
                    name,
                    size: meta.size,
                    modified: meta.modified,
                }),
                Ok(_) => {}
                // Removed between listing and stat.
                Err(e) => tracing::debug!(file = %name, error = %e, "skipping log file"),
            }
        }

        files.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.name.cmp(&b.name))
        });
        files
    }

    /// The last `line_count` non-empty lines of a file, newest first.
    pub async fn tail(&self, name: &str, line_count: usize) -> LogResult<TailResult> {
        let path = self.resolve(name)?;
        let mut reader = self
            .fs
            .open(&path)
            .await
            .map_err(|e| LogError::from_read(&path, e))?;
        let lines = tail_lines(&mut reader, line_count, self.config.chunk_size)
            .await
            .map_err(|e| LogError::from_read(&path, e))?;

        tracing::debug!(file = %path.display(), requested = line_count, returned = lines.len(), "tailed log file");
        Ok(TailResult { lines })
    }

    /// Lines containing `term` (case-insensitive), at most `max_matches`.
    pub async fn search(
        &self,
        name: &str,
        term: &str,
        max_matches: usize,
    ) -> LogResult<Vec<SearchMatch>> {
        let matcher = Matcher::new(term, self.config.highlight.clone())?;
        let path = self.resolve(name)?;
        let mut reader = self
            .fs
            .open(&path)
            .await
            .map_err(|e| LogError::from_open(&path, e))?;
        let matches = search_lines(&mut reader, &matcher, max_matches)
            .await
            .map_err(|e| LogError::from_read(&path, e))?;

        tracing::debug!(file = %path.display(), term, matches = matches.len(), "searched log file");
        Ok(matches)
    }

    /// Delete a log file.
    ///
    /// A file that does not exist is reported as [`DeleteOutcome::AlreadyGone`];
    /// a file that exists but cannot be removed is an error.
    pub async fn delete_file(&self, name: &str) -> LogResult<DeleteOutcome> {
        let path = self.resolve(name)?;

        match self.fs.remove(&path).await {
            Ok(()) => {
                tracing::info!(file = %path.display(), "deleted log file");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(file = %path.display(), "log file already gone");
                Ok(DeleteOutcome::AlreadyGone)
            }
            Err(e) => Err(LogError::Io(format!("{}: {e}", path.display()))),
        }
    }

    /// File count and total size of the listed log files.
    pub async fn file_statistics(&self) -> FileStatistics {
        summarize(&self.list_files().await)
    }
}

fn base_name(name: &str) -> LogResult<&str> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LogError::Validation(format!("invalid log file name: {name:?}")))
}
