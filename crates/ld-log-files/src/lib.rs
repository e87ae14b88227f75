//! Flat-file log engine for logdesk.
//!
//! Lists the log files of one directory, reads the last N lines of a file
//! without loading it whole, searches files line by line with highlighted
//! hits, deletes files, and reports aggregate directory size. All file
//! access goes through the [`LogFs`] abstraction so the engine can be
//! exercised against [`MockLogFs`].

pub mod engine;
pub mod error;
pub mod fs;
pub mod mock;
pub mod search;
pub mod stats;
pub mod tail;
pub mod types;

// Re-export key types for convenience
pub use engine::LogFileEngine;
pub use error::{LogError, LogResult};
pub use fs::{FileMeta, FileSystemLogFs, LogFs, LogReader};
pub use mock::MockLogFs;
pub use search::Matcher;
pub use stats::format_size;
pub use tail::tail_lines;
pub use types::{
    DeleteOutcome, FileStatistics, Highlight, LogFileDescriptor, LogFilesConfig, SearchMatch,
    TailResult,
};
