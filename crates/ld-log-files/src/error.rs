//! Flat-file log error types.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur during flat-file log operations.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log file not found: {0}")]
    NotFound(String),

    /// Permission denied while reading an existing file.
    #[error("log file unreadable: {0}")]
    Unreadable(String),

    /// The file exists but could not be opened for a forward scan.
    #[error("failed to open log file: {0}")]
    Open(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid request: {0}")]
    Validation(String),
}

impl LogError {
    /// Map an I/O error raised while reading `path`.
    ///
    /// `NotFound` and `PermissionDenied` keep their own kinds, anything
    /// else becomes [`LogError::Io`].
    pub fn from_read(path: &Path, err: io::Error) -> Self {
        let shown = path.display();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(shown.to_string()),
            io::ErrorKind::PermissionDenied => Self::Unreadable(format!("{shown}: {err}")),
            _ => Self::Io(format!("{shown}: {err}")),
        }
    }

    /// Map an I/O error raised while opening `path` for a search scan.
    pub fn from_open(path: &Path, err: io::Error) -> Self {
        let shown = path.display();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(shown.to_string()),
            _ => Self::Open(format!("{shown}: {err}")),
        }
    }

    /// True for errors a caller should treat as "the file went away".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience alias for flat-file log results.
pub type LogResult<T> = Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn read_errors_keep_kind() {
        let path = PathBuf::from("/var/log/app/app.log");
        let err = LogError::from_read(&path, io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());

        let err = LogError::from_read(&path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, LogError::Unreadable(_)));

        let err = LogError::from_read(&path, io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, LogError::Io(_)));
    }

    #[test]
    fn open_errors_distinct_from_not_found() {
        let path = PathBuf::from("/var/log/app/app.log");
        let err = LogError::from_open(&path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, LogError::Open(_)));
        assert!(err.to_string().contains("app.log"));

        let err = LogError::from_open(&path, io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
    }
}
