//! Mock filesystem for testing. Serves pre-loaded log content.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;

use crate::fs::{FileMeta, LogFs, LogReader};

#[derive(Debug, Clone)]
struct MockFile {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
    readable: bool,
    removable: bool,
}

/// An in-memory filesystem that serves pre-loaded files by path.
pub struct MockLogFs {
    files: RwLock<HashMap<PathBuf, MockFile>>,
    dirs: HashSet<PathBuf>,
}

impl MockLogFs {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            dirs: HashSet::new(),
        }
    }

    /// Add a file with the given content, modified at `modified`.
    pub fn add_file(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
        modified: DateTime<Utc>,
    ) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
        self.files.get_mut().insert(
            path,
            MockFile {
                bytes: content.into(),
                modified,
                readable: true,
                removable: true,
            },
        );
    }

    /// Add a file made of `lines`, each terminated by `\n`.
    pub fn add_lines(&mut self, path: impl Into<PathBuf>, lines: &[&str]) {
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        self.add_file(path, content, epoch_plus(0));
    }

    /// Add an empty directory (also usable as a non-file entry inside another one).
    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        self.dirs.insert(path.into());
    }

    /// Make an existing file fail on open with `PermissionDenied`.
    pub fn deny_read(&mut self, path: impl AsRef<Path>) {
        if let Some(file) = self.files.get_mut().get_mut(path.as_ref()) {
            file.readable = false;
        }
    }

    /// Make an existing file fail on removal with `PermissionDenied`.
    pub fn deny_remove(&mut self, path: impl AsRef<Path>) {
        if let Some(file) = self.files.get_mut().get_mut(path.as_ref()) {
            file.removable = false;
        }
    }

    /// Whether a file is currently present.
    pub async fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.read().await.contains_key(path.as_ref())
    }

    /// A sample shop log directory at `/var/log/shop`.
    pub fn with_shop_sample() -> Self {
        let mut m = Self::new();
        m.add_file(
            "/var/log/shop/debug.log",
            concat!(
                "2024-01-15 12:00:01 INFO Checkout page rendered\n",
                "2024-01-15 12:00:05 ERROR: disk full while writing order cache\n",
                "\n",
                "2024-01-15 12:00:10 WARNING Payment gateway slow (2300ms)\n",
                "2024-01-15 12:00:15 INFO Order 1042 placed\n",
                "2024-01-15 12:00:20 error retrying payment webhook\n",
                "2024-01-15 12:00:25 INFO Cron: cleanup finished\n",
            ),
            epoch_plus(300),
        );
        m.add_file(
            "/var/log/shop/payments.log",
            "2024-01-14 08:00:00 INFO gateway online\n",
            epoch_plus(200),
        );
        m.add_file(
            "/var/log/shop/notes.txt",
            "not a log\n",
            epoch_plus(400),
        );
        m.add_dir("/var/log/shop/archive.log");
        m
    }
}

fn epoch_plus(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_705_320_000 + secs, 0)
        .single()
        .unwrap_or_default()
}

impl Default for MockLogFs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogFs for MockLogFs {
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        if !self.dirs.contains(dir) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        let files = self.files.read().await;
        let names = files
            .keys()
            .map(PathBuf::as_path)
            .chain(self.dirs.iter().map(PathBuf::as_path))
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name()?.to_str().map(String::from))
            .collect();
        Ok(names)
    }

    async fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        if let Some(file) = self.files.read().await.get(path) {
            return Ok(FileMeta {
                is_file: true,
                size: file.bytes.len() as u64,
                modified: file.modified,
            });
        }
        if self.dirs.contains(path) {
            return Ok(FileMeta {
                is_file: false,
                size: 0,
                modified: epoch_plus(0),
            });
        }
        Err(io::Error::from(io::ErrorKind::NotFound))
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn LogReader>> {
        let files = self.files.read().await;
        let file = files
            .get(path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        if !file.readable {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(Box::new(io::Cursor::new(file.bytes.clone())))
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        let mut files = self.files.write().await;
        match files.get(path) {
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
            Some(file) if !file.removable => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
            Some(_) => {
                files.remove(path);
                Ok(())
            }
        }
    }
}
