//! Filesystem abstraction: list, stat, open and remove log files.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncSeek};

/// A seekable byte source handed out by [`LogFs::open`].
///
/// The handle is released when the box is dropped, on success and error
/// paths alike.
pub trait LogReader: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T> LogReader for T where T: AsyncRead + AsyncSeek + Unpin + Send {}

/// Metadata the engine needs about one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub is_file: bool,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Filesystem operations used by the log engine.
///
/// Errors stay as raw `io::Error`s here; the engine decides which
/// [`LogError`](crate::LogError) kind they become for each operation.
#[async_trait]
pub trait LogFs: Send + Sync {
    /// Names of all entries directly inside `dir`.
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;

    async fn metadata(&self, path: &Path) -> io::Result<FileMeta>;

    /// Open `path` for reading and seeking.
    async fn open(&self, path: &Path) -> io::Result<Box<dyn LogReader>>;

    async fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Reads logs from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemLogFs;

#[async_trait]
impl LogFs for FileSystemLogFs {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::debug!(name = ?raw, "skipping non-UTF-8 file name"),
            }
        }
        Ok(names)
    }

    async fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        let meta = tokio::fs::metadata(path).await?;
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(FileMeta {
            is_file: meta.is_file(),
            size: meta.len(),
            modified: DateTime::<Utc>::from(modified),
        })
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn LogReader>> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}
