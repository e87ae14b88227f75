//! In-memory log store with the same filter semantics as the database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::store::{LogStore, window_start};
use crate::types::{
    GroupCount, LogFilter, LogRecord, LogSeverity, LogStatistics, Page, sort_newest_first,
};

/// A log store held in a `Vec`, used for development and tests.
pub struct MemoryLogStore {
    records: RwLock<Vec<LogRecord>>,
    next_id: AtomicI64,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Append a record, assigning the next id.
    pub async fn insert(
        &self,
        timestamp: DateTime<Utc>,
        level: LogSeverity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> LogRecord {
        let record = LogRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            timestamp,
            level,
            source: source.into(),
            message: message.into(),
        };
        self.records.write().await.push(record.clone());
        record
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// A store with a handful of shop records spread over the last three days.
    pub async fn with_sample_data() -> Self {
        let store = Self::new();
        let now = Utc::now();
        let samples = [
            (72, LogSeverity::Info, "cron", "Nightly cleanup finished"),
            (50, LogSeverity::Warning, "payment", "Gateway responded slowly (2300ms)"),
            (30, LogSeverity::Error, "payment", "Gateway timeout after 30s"),
            (6, LogSeverity::Info, "checkout", "Order 1042 placed"),
            (3, LogSeverity::Error, "inventory", "Stock sync failed: SKU-88 missing"),
            (1, LogSeverity::Debug, "checkout", "Cart recalculated"),
        ];
        for (hours_ago, level, source, message) in samples {
            store
                .insert(now - Duration::hours(hours_ago), level, source, message)
                .await;
        }
        store
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn query(&self, filter: &LogFilter, page: Page) -> StoreResult<Vec<LogRecord>> {
        filter.validate()?;
        let now = Utc::now();
        let mut matched: Vec<_> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r, now))
            .cloned()
            .collect();
        sort_newest_first(&mut matched);
        Ok(page.apply(matched))
    }

    async fn count(&self, filter: &LogFilter) -> StoreResult<u64> {
        filter.validate()?;
        let now = Utc::now();
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r, now)).count() as u64)
    }

    async fn purge(&self, filter: &LogFilter) -> StoreResult<u64> {
        filter.validate()?;
        if filter.is_empty() {
            tracing::warn!("purging every log record");
        }
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !filter.matches(r, now));
        let purged = (before - records.len()) as u64;
        tracing::info!(purged, "purged log records");
        Ok(purged)
    }

    async fn statistics(&self, window: Duration) -> StoreResult<LogStatistics> {
        let since = window_start(Utc::now(), window)?;
        let records = self.records.read().await;

        let mut counts: HashMap<(LogSeverity, &str), u64> = HashMap::new();
        for record in records.iter() {
            *counts
                .entry((record.level, record.source.as_str()))
                .or_default() += 1;
        }
        let groups = counts
            .into_iter()
            .map(|((level, source), count)| GroupCount {
                level,
                source: source.to_string(),
                count,
            })
            .collect();
        let recent = records.iter().filter(|r| r.timestamp >= since).count() as u64;

        Ok(LogStatistics::new(groups, recent, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::default_stats_window;

    #[tokio::test]
    async fn query_all_newest_first() {
        let store = MemoryLogStore::with_sample_data().await;
        let records = store.query(&LogFilter::new(), Page::all()).await.unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(records[0].message, "Cart recalculated");
    }

    #[tokio::test]
    async fn query_by_severity() {
        let store = MemoryLogStore::with_sample_data().await;
        let filter = LogFilter::new().with_level(LogSeverity::Error);
        let records = store.query(&filter, Page::all()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.level == LogSeverity::Error));
    }

    #[tokio::test]
    async fn count_matches_unbounded_query() {
        let store = MemoryLogStore::with_sample_data().await;
        let filters = [
            LogFilter::new(),
            LogFilter::new().with_source("payment"),
            LogFilter::new().with_contains("GATEWAY"),
            LogFilter::new().with_level(LogSeverity::Critical),
            LogFilter::new().older_than_days(1),
        ];
        for filter in filters {
            let listed = store.query(&filter, Page::all()).await.unwrap().len() as u64;
            assert_eq!(store.count(&filter).await.unwrap(), listed, "{filter:?}");
        }
    }

    #[tokio::test]
    async fn paging_walks_the_result() {
        let store = MemoryLogStore::with_sample_data().await;
        let all = store.query(&LogFilter::new(), Page::all()).await.unwrap();
        let second = store.query(&LogFilter::new(), Page::new(2, 2)).await.unwrap();
        assert_eq!(second, all[2..4].to_vec());
        let tail = store.query(&LogFilter::new(), Page::new(0, 5)).await.unwrap();
        assert_eq!(tail, all[5..].to_vec());
    }

    #[tokio::test]
    async fn round_trip_record() {
        let store = MemoryLogStore::with_sample_data().await;
        let written = store
            .insert(Utc::now(), LogSeverity::Notice, "webhook", "Delivery 77 acknowledged")
            .await;
        let filter = LogFilter::new()
            .with_source("webhook")
            .with_contains("delivery 77");
        let found = store.query(&filter, Page::all()).await.unwrap();
        assert_eq!(found, vec![written]);
    }

    #[tokio::test]
    async fn purge_older_than() {
        let store = MemoryLogStore::with_sample_data().await;
        let purged = store
            .purge(&LogFilter::new().older_than_days(2))
            .await
            .unwrap();
        assert_eq!(purged, 2);
        assert_eq!(store.len().await, 4);

        // Nothing left to match is still a success.
        let purged = store
            .purge(&LogFilter::new().older_than_days(2))
            .await
            .unwrap();
        assert_eq!(purged, 0);
    }

    #[tokio::test]
    async fn purge_everything() {
        let store = MemoryLogStore::with_sample_data().await;
        assert_eq!(store.purge(&LogFilter::new()).await.unwrap(), 6);
        assert!(store.is_empty().await);
        assert_eq!(store.count(&LogFilter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_range_rejected() {
        let store = MemoryLogStore::new();
        let now = Utc::now();
        let filter = LogFilter::new()
            .with_from(now)
            .with_to(now - Duration::hours(1));
        let err = store.query(&filter, Page::all()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.purge(&filter).await.is_err());
    }

    #[tokio::test]
    async fn statistics_groups_and_window() {
        let store = MemoryLogStore::with_sample_data().await;
        let stats = store.statistics(default_stats_window()).await.unwrap();
        assert_eq!(stats.total, 6);
        assert_eq!(stats.recent, 3);
        assert_eq!(stats.groups.len(), 6);
        assert_eq!(stats.count_for(LogSeverity::Error), 2);
        assert_eq!(stats.window_secs, 86_400);
    }

    #[tokio::test]
    async fn huge_age_never_panics() {
        let store = MemoryLogStore::with_sample_data().await;
        let filter = LogFilter::new().older_than_days(u32::MAX);
        let err = store.count(&filter).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store.purge(&filter).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.len().await, 6);
    }

    #[tokio::test]
    async fn statistics_rejects_huge_window() {
        let store = MemoryLogStore::with_sample_data().await;
        let err = store
            .statistics(Duration::hours(i64::from(u32::MAX)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn statistics_empty_store() {
        let store = MemoryLogStore::new();
        let stats = store.statistics(default_stats_window()).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.recent, 0);
        assert!(stats.groups.is_empty());
    }
}
