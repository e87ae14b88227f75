//! PostgreSQL-backed log store.
//!
//! Expects a table of the shape
//!
//! ```sql
//! CREATE TABLE app_logs (
//!     id        BIGSERIAL PRIMARY KEY,
//!     logged_at TIMESTAMPTZ NOT NULL,
//!     level     TEXT NOT NULL,
//!     source    TEXT NOT NULL,
//!     message   TEXT NOT NULL
//! );
//! ```
//!
//! Creating it is left to whoever writes the records.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::{StoreError, StoreResult};
use crate::sql::{self, LogTable};
use crate::store::{LogStore, window_start};
use crate::types::{GroupCount, LogFilter, LogRecord, LogSeverity, LogStatistics, Page};

/// Connect to PostgreSQL.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    tracing::info!(max_connections, "connected to log database");
    Ok(pool)
}

/// Log row returned from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct LogRecordRow {
    id: i64,
    logged_at: DateTime<Utc>,
    level: String,
    source: String,
    message: String,
}

impl TryFrom<LogRecordRow> for LogRecord {
    type Error = StoreError;

    fn try_from(row: LogRecordRow) -> StoreResult<Self> {
        let level = LogSeverity::from_column(&row.level).ok_or_else(|| StoreError::Decode {
            id: row.id,
            message: format!("unknown severity '{}'", row.level),
        })?;
        Ok(Self {
            id: row.id,
            timestamp: row.logged_at,
            level,
            source: row.source,
            message: row.message,
        })
    }
}

/// Per-(level, source) count row.
#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    level: String,
    source: String,
    count: i64,
}

/// Log store reading one table through a `PgPool`.
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
    table: LogTable,
}

impl PgLogStore {
    /// Create a store over `table`, which must be a plain SQL identifier.
    pub fn new(pool: PgPool, table: &str) -> StoreResult<Self> {
        Ok(Self {
            pool,
            table: LogTable::new(table)?,
        })
    }

    pub fn table(&self) -> &str {
        self.table.as_str()
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn query(&self, filter: &LogFilter, page: Page) -> StoreResult<Vec<LogRecord>> {
        filter.validate()?;
        let mut qb = sql::select_records(&self.table, filter, page, Utc::now());
        let rows = qb
            .build_query_as::<LogRecordRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx("log query"))?;

        tracing::debug!(rows = rows.len(), "queried log records");
        rows.into_iter().map(LogRecord::try_from).collect()
    }

    async fn count(&self, filter: &LogFilter) -> StoreResult<u64> {
        filter.validate()?;
        let mut qb = sql::count_records(&self.table, filter, Utc::now());
        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx("log count"))?;
        Ok(count.max(0) as u64)
    }

    async fn purge(&self, filter: &LogFilter) -> StoreResult<u64> {
        filter.validate()?;
        if filter.is_empty() {
            tracing::warn!(table = self.table(), "purging every log record");
        }
        let mut qb = sql::delete_records(&self.table, filter, Utc::now());
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx("log purge"))?;

        let purged = result.rows_affected();
        tracing::info!(table = self.table(), purged, "purged log records");
        Ok(purged)
    }

    async fn statistics(&self, window: Duration) -> StoreResult<LogStatistics> {
        let since = window_start(Utc::now(), window)?;
        let mut groups_qb = sql::group_counts(&self.table);
        let rows = groups_qb
            .build_query_as::<GroupRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx("log statistics"))?;
        let mut recent_qb = sql::count_since(&self.table, since);
        let recent = recent_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx("recent log count"))?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            match LogSeverity::from_column(&row.level) {
                Some(level) => groups.push(GroupCount {
                    level,
                    source: row.source,
                    count: row.count.max(0) as u64,
                }),
                None => tracing::warn!(
                    level = %row.level,
                    count = row.count,
                    "skipping unknown severity in statistics"
                ),
            }
        }

        Ok(LogStatistics::new(groups, recent.max(0) as u64, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(level: &str) -> LogRecordRow {
        LogRecordRow {
            id: 42,
            logged_at: Utc::now(),
            level: level.into(),
            source: "checkout".into(),
            message: "Order 1042 placed".into(),
        }
    }

    #[test]
    fn row_converts_to_record() {
        let record = LogRecord::try_from(row("warning")).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.level, LogSeverity::Warning);
        assert_eq!(record.source, "checkout");
    }

    #[test]
    fn unknown_severity_is_decode_error() {
        let err = LogRecord::try_from(row("loud")).unwrap_err();
        assert!(matches!(err, StoreError::Decode { id: 42, .. }));
    }

    #[test]
    fn non_canonical_severity_is_decode_error() {
        // A level filter compares the column exactly, so rows it could
        // never match must not decode either.
        for level in ["WARNING", "warn", "Error"] {
            let err = LogRecord::try_from(row(level)).unwrap_err();
            assert!(matches!(err, StoreError::Decode { .. }), "{level}");
        }
    }

    #[tokio::test]
    async fn rejects_unsafe_table_name() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://logdesk@localhost/logdesk")
            .unwrap();
        assert!(PgLogStore::new(pool.clone(), "app_logs; DROP TABLE users").is_err());
        let store = PgLogStore::new(pool, "app_logs").unwrap();
        assert_eq!(store.table(), "app_logs");
    }

    #[tokio::test]
    async fn out_of_range_inputs_fail_before_any_query() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://logdesk@localhost/logdesk")
            .unwrap();
        let store = PgLogStore::new(pool, "app_logs").unwrap();
        let filter = LogFilter::new().older_than_days(u32::MAX);
        assert!(matches!(store.purge(&filter).await, Err(StoreError::Validation(_))));
        let window = Duration::hours(i64::from(u32::MAX));
        assert!(matches!(store.statistics(window).await, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn validation_happens_before_any_query() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://logdesk@localhost/logdesk")
            .unwrap();
        let store = PgLogStore::new(pool, "app_logs").unwrap();
        let now = Utc::now();
        let filter = LogFilter::new().with_from(now).with_to(now - Duration::days(1));
        let err = store.count(&filter).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
