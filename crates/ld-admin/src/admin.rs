//! The `LogAdmin` facade over the flat-file engine and the structured store.
//!
//! Supports two storage modes:
//! - **Database mode**: records live in a PostgreSQL table (production).
//! - **In-memory mode**: records live in a `MemoryLogStore` (tests and development).

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use ld_log_files::{
    DeleteOutcome, FileStatistics, LogFileDescriptor, LogFileEngine, SearchMatch, TailResult,
};
use ld_log_store::{
    LogFilter, LogRecord, LogStatistics, LogStore, MemoryLogStore, Page, PgLogStore, StoreError,
};

use crate::config::AdminConfig;
use crate::error::AdminResult;

/// Combined view of both log sources at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogReport {
    pub generated_at: DateTime<Utc>,
    pub records: LogStatistics,
    pub files: FileStatistics,
}

/// Entry point for log administration, wrapped in `Arc`s for sharing.
#[derive(Clone)]
pub struct LogAdmin {
    files: Arc<LogFileEngine>,
    store: Arc<dyn LogStore>,
    stats_window: Duration,
}

impl LogAdmin {
    pub fn new(files: LogFileEngine, store: Arc<dyn LogStore>, stats_window: Duration) -> Self {
        Self {
            files: Arc::new(files),
            store,
            stats_window,
        }
    }

    /// Build both components from `config`.
    ///
    /// Without a `database_url` the structured store falls back to an empty
    /// in-memory store.
    pub async fn connect(config: &AdminConfig) -> AdminResult<Self> {
        let files = LogFileEngine::local(config.log_files());
        let store: Arc<dyn LogStore> = match &config.database_url {
            Some(url) => {
                let pool = ld_log_store::connect(url, config.max_connections)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "log database connection failed");
                        StoreError::Store(format!("connect: {e}"))
                    })?;
                Arc::new(PgLogStore::new(pool, &config.table_name)?)
            }
            None => {
                tracing::warn!("no database_url configured, using in-memory log store");
                Arc::new(MemoryLogStore::new())
            }
        };

        tracing::info!(
            log_dir = %config.log_dir.display(),
            table = %config.table_name,
            "log admin ready"
        );
        Ok(Self::new(files, store, config.stats_window()))
    }

    pub fn files(&self) -> &LogFileEngine {
        &self.files
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    // ── Structured records ──────────────────────────────────────

    pub async fn query(&self, filter: &LogFilter, page: Page) -> AdminResult<Vec<LogRecord>> {
        Ok(self.store.query(filter, page).await?)
    }

    pub async fn count(&self, filter: &LogFilter) -> AdminResult<u64> {
        Ok(self.store.count(filter).await?)
    }

    pub async fn purge(&self, filter: &LogFilter) -> AdminResult<u64> {
        Ok(self.store.purge(filter).await?)
    }

    /// Statistics over the configured rolling window.
    pub async fn statistics(&self) -> AdminResult<LogStatistics> {
        Ok(self.store.statistics(self.stats_window).await?)
    }

    // ── Flat files ──────────────────────────────────────────────

    pub async fn list_files(&self) -> Vec<LogFileDescriptor> {
        self.files.list_files().await
    }

    pub async fn tail(&self, name: &str, line_count: usize) -> AdminResult<TailResult> {
        Ok(self.files.tail(name, line_count).await?)
    }

    pub async fn search(
        &self,
        name: &str,
        term: &str,
        max_matches: usize,
    ) -> AdminResult<Vec<SearchMatch>> {
        Ok(self.files.search(name, term, max_matches).await?)
    }

    pub async fn delete_file(&self, name: &str) -> AdminResult<DeleteOutcome> {
        Ok(self.files.delete_file(name).await?)
    }

    pub async fn file_statistics(&self) -> FileStatistics {
        self.files.file_statistics().await
    }

    /// Record statistics and file statistics together.
    pub async fn report(&self) -> AdminResult<LogReport> {
        let records = self.statistics().await?;
        let files = self.file_statistics().await;
        tracing::debug!(
            records = records.total,
            files = files.file_count,
            "built log report"
        );
        Ok(LogReport {
            generated_at: Utc::now(),
            records,
            files,
        })
    }
}
