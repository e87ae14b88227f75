//! Structured log records, filters and statistics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};

// ── Log Severity ──────────────────────────────────────────────

/// Log severity level, ordered from least to most severe.
///
/// Variant declaration order is used by `#[derive(Ord)]`,
/// so Debug < Info < Notice < Warning < Error < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
}

impl LogSeverity {
    pub const ALL: [Self; 6] = [
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// Name as stored in the `level` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl LogSeverity {
    /// Parse a stored `level` value. Only the exact names written by
    /// [`as_str`](Self::as_str) are accepted, since filters compare the
    /// column by equality.
    pub fn from_column(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

impl FromStr for LogSeverity {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "notice" => Ok(Self::Notice),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(StoreError::Validation(format!("unknown severity: {other}"))),
        }
    }
}

impl std::fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Log Record ────────────────────────────────────────────────

/// One row of the structured log store. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Assigned at insertion, increasing in insertion order.
    pub id: i64,
    /// Usually non-decreasing with `id`, but clock skew can break that.
    pub timestamp: DateTime<Utc>,
    pub level: LogSeverity,
    /// Free-form origin tag, e.g. a subsystem name.
    pub source: String,
    pub message: String,
}

// ── Filter ────────────────────────────────────────────────────

/// Largest accepted `older_than_days`, about 2700 years. Older cutoffs
/// fall outside the range PostgreSQL timestamps can hold.
pub const MAX_OLDER_THAN_DAYS: u32 = 1_000_000;

/// Optional predicates over log records, combined with AND.
///
/// A `None` field places no constraint. The same filter drives
/// `query`, `count` and `purge`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Source tag equals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Severity equals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogSeverity>,
    /// Message contains, case-insensitive. Empty means no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    /// Timestamp at or after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    /// Timestamp at or before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    /// Timestamp strictly before "now minus N days", where now is the
    /// moment the operation runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub older_than_days: Option<u32>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_level(mut self, level: LogSeverity) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_contains(mut self, term: impl Into<String>) -> Self {
        self.contains = Some(term.into());
        self
    }

    pub fn with_from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn older_than_days(mut self, days: u32) -> Self {
        self.older_than_days = Some(days);
        self
    }

    /// The substring predicate, if it constrains anything.
    pub fn contains_term(&self) -> Option<&str> {
        self.contains.as_deref().filter(|t| !t.is_empty())
    }

    /// Cutoff for `older_than_days`, relative to `now`.
    ///
    /// Saturates at the earliest representable instant, which no record
    /// is older than.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.older_than_days.map(|days| {
            Duration::try_days(i64::from(days))
                .and_then(|age| now.checked_sub_signed(age))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        })
    }

    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.level.is_none()
            && self.contains_term().is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.older_than_days.is_none()
    }

    pub fn validate(&self) -> StoreResult<()> {
        if let Some(days) = self.older_than_days.filter(|&d| d > MAX_OLDER_THAN_DAYS) {
            return Err(StoreError::Validation(format!(
                "older_than_days {days} exceeds {MAX_OLDER_THAN_DAYS}"
            )));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(StoreError::Validation(format!(
                    "time range starts after it ends ({from} > {to})"
                )));
            }
        }
        Ok(())
    }

    /// Evaluate the filter against one record.
    pub fn matches(&self, record: &LogRecord, now: DateTime<Utc>) -> bool {
        if self.source.as_deref().is_some_and(|s| s != record.source) {
            return false;
        }
        if self.level.is_some_and(|l| l != record.level) {
            return false;
        }
        if let Some(term) = self.contains_term() {
            if !record
                .message
                .to_lowercase()
                .contains(&term.to_lowercase())
            {
                return false;
            }
        }
        if self.from.is_some_and(|from| record.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.timestamp > to) {
            return false;
        }
        if self.cutoff(now).is_some_and(|cutoff| record.timestamp >= cutoff) {
            return false;
        }
        true
    }
}

// ── Pagination ────────────────────────────────────────────────

/// Limit and offset for `query`.
///
/// A limit of zero or less means unbounded. The offset applies with or
/// without a limit; negative offsets count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Page {
    /// Every matching record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn first(limit: i64) -> Self {
        Self::new(limit, 0)
    }

    pub fn limit(&self) -> Option<i64> {
        (self.limit > 0).then_some(self.limit)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }

    /// Apply the page to records already in result order.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset() as usize);
        match self.limit() {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

// ── Statistics ────────────────────────────────────────────────

/// Number of records sharing a (severity, source) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub level: LogSeverity,
    pub source: String,
    pub count: u64,
}

/// Aggregate view of the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStatistics {
    /// Sorted by count descending, then severity and source.
    pub groups: Vec<GroupCount>,
    pub total: u64,
    /// Records whose timestamp falls inside the rolling window.
    pub recent: u64,
    pub window_secs: i64,
}

impl LogStatistics {
    pub fn new(mut groups: Vec<GroupCount>, recent: u64, window: Duration) -> Self {
        groups.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.level.cmp(&b.level))
                .then_with(|| a.source.cmp(&b.source))
        });
        let total = groups.iter().map(|g| g.count).sum();
        Self {
            groups,
            total,
            recent,
            window_secs: window.num_seconds(),
        }
    }

    /// Records of one severity across all sources.
    pub fn count_for(&self, level: LogSeverity) -> u64 {
        self.groups
            .iter()
            .filter(|g| g.level == level)
            .map(|g| g.count)
            .sum()
    }
}

/// Newest first: timestamp descending, ties by id descending.
pub fn sort_newest_first(records: &mut [LogRecord]) {
    records.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
}
