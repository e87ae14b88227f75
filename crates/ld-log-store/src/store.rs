//! The `LogStore` trait: the accessor contract over a structured log table.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::{StoreError, StoreResult};
use crate::types::{LogFilter, LogRecord, LogStatistics, MAX_OLDER_THAN_DAYS, Page};

/// Hours in the default rolling window for [`LogStore::statistics`].
pub const DEFAULT_STATS_WINDOW_HOURS: i64 = 24;

/// The default rolling window for [`LogStore::statistics`].
pub fn default_stats_window() -> Duration {
    Duration::hours(DEFAULT_STATS_WINDOW_HOURS)
}

/// Start of a statistics window ending at `now`.
///
/// Windows must be non-negative and no longer than
/// [`MAX_OLDER_THAN_DAYS`] days.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> StoreResult<DateTime<Utc>> {
    let too_long = Duration::try_days(i64::from(MAX_OLDER_THAN_DAYS))
        .is_none_or(|max| window > max);
    if window < Duration::zero() || too_long {
        return Err(StoreError::Validation(format!(
            "statistics window of {}s is out of range",
            window.num_seconds()
        )));
    }
    now.checked_sub_signed(window).ok_or_else(|| {
        StoreError::Validation(format!(
            "statistics window of {}s reaches before the earliest timestamp",
            window.num_seconds()
        ))
    })
}

/// Read and purge access to structured log records.
///
/// Implemented over PostgreSQL ([`PgLogStore`](crate::PgLogStore)) and in
/// memory ([`MemoryLogStore`](crate::MemoryLogStore)); both evaluate
/// filters identically.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Matching records, newest first (timestamp descending, then id
    /// descending), restricted to `page`.
    async fn query(&self, filter: &LogFilter, page: Page) -> StoreResult<Vec<LogRecord>>;

    /// Number of matching records, ignoring pagination.
    async fn count(&self, filter: &LogFilter) -> StoreResult<u64>;

    /// Delete every matching record and return how many were removed.
    ///
    /// Matching nothing is not an error.
    async fn purge(&self, filter: &LogFilter) -> StoreResult<u64>;

    /// Counts per (severity, source) plus the number of records stamped
    /// within `window` of now.
    async fn statistics(&self, window: Duration) -> StoreResult<LogStatistics>;
}
