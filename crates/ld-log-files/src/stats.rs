//! Directory size statistics.

use crate::types::{FileStatistics, LogFileDescriptor};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with a binary unit suffix, e.g. `"1.5 MB"`.
///
/// The value is divided by 1024 while it exceeds 1024 and a larger unit
/// remains, then rounded to two decimals. Trailing zeros are not printed.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value > 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Summarize a listing into counts and total size.
pub fn summarize(files: &[LogFileDescriptor]) -> FileStatistics {
    let total_bytes = files.iter().map(|f| f.size).sum();
    FileStatistics {
        file_count: files.len(),
        total_bytes,
        human_size: format_size(total_bytes),
    }
}
