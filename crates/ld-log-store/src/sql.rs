//! Translation of [`LogFilter`]s into parameterized PostgreSQL statements.
//!
//! Every caller-supplied value is bound as a `$n` parameter. The only text
//! spliced into statements is the table name, which is checked to be a
//! plain identifier when the [`LogTable`] is built.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::error::{StoreError, StoreResult};
use crate::types::{LogFilter, Page};

/// Columns selected for a record, in `LogRecordRow` field order.
const RECORD_COLUMNS: &str = "id, logged_at, level, source, message";

/// A validated table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTable(String);

impl LogTable {
    pub fn new(name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_start || !valid_rest || name.len() > 63 {
            return Err(StoreError::Validation(format!(
                "invalid table name: {name:?}"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `SELECT` matching records, newest first, paged.
pub fn select_records(
    table: &LogTable,
    filter: &LogFilter,
    page: Page,
    now: DateTime<Utc>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {RECORD_COLUMNS} FROM {}", table.as_str()));
    push_where(&mut qb, filter, now);
    qb.push(" ORDER BY logged_at DESC, id DESC");
    if let Some(limit) = page.limit() {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if page.offset() > 0 {
        qb.push(" OFFSET ").push_bind(page.offset());
    }
    qb
}

/// `SELECT COUNT(*)` of matching records.
pub fn count_records(
    table: &LogTable,
    filter: &LogFilter,
    now: DateTime<Utc>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table.as_str()));
    push_where(&mut qb, filter, now);
    qb
}

/// `DELETE` matching records.
pub fn delete_records(
    table: &LogTable,
    filter: &LogFilter,
    now: DateTime<Utc>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("DELETE FROM {}", table.as_str()));
    push_where(&mut qb, filter, now);
    qb
}

/// Record counts per (level, source).
pub fn group_counts(table: &LogTable) -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!(
        "SELECT level, source, COUNT(*) AS count FROM {} GROUP BY level, source",
        table.as_str()
    ))
}

/// Records stamped at or after `since`.
pub fn count_since(table: &LogTable, since: DateTime<Utc>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT COUNT(*) FROM {} WHERE logged_at >= ",
        table.as_str()
    ));
    qb.push_bind(since);
    qb
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filter: &LogFilter, now: DateTime<Utc>) {
    let mut first = true;
    let mut clause = |qb: &mut QueryBuilder<'static, Postgres>, sql: &str| {
        qb.push(if first { " WHERE " } else { " AND " });
        qb.push(sql);
        first = false;
    };

    if let Some(source) = &filter.source {
        clause(qb, "source = ");
        qb.push_bind(source.clone());
    }
    if let Some(level) = filter.level {
        clause(qb, "level = ");
        qb.push_bind(level.as_str());
    }
    if let Some(term) = filter.contains_term() {
        clause(qb, "message ILIKE ");
        qb.push_bind(like_pattern(term));
        qb.push(" ESCAPE '\\'");
    }
    if let Some(from) = filter.from {
        clause(qb, "logged_at >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.to {
        clause(qb, "logged_at <= ");
        qb.push_bind(to);
    }
    if let Some(cutoff) = filter.cutoff(now) {
        clause(qb, "logged_at < ");
        qb.push_bind(cutoff);
    }
}

/// `%term%` with LIKE wildcards in the term escaped.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogSeverity;
    use chrono::TimeZone;

    fn table() -> LogTable {
        LogTable::new("shop_logs").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_705_320_000, 0).single().unwrap()
    }

    #[test]
    fn table_names_validated() {
        assert!(LogTable::new("wp_shop_logs").is_ok());
        assert!(LogTable::new("_logs2").is_ok());
        let too_long = "x".repeat(64);
        for bad in ["", "2logs", "logs; DROP TABLE x", "logs-table", "\"logs\"", too_long.as_str()] {
            assert!(LogTable::new(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn select_without_predicates() {
        let qb = select_records(&table(), &LogFilter::new(), Page::all(), now());
        assert_eq!(
            qb.sql(),
            "SELECT id, logged_at, level, source, message FROM shop_logs ORDER BY logged_at DESC, id DESC"
        );
    }

    #[test]
    fn select_with_every_predicate() {
        let filter = LogFilter::new()
            .with_source("payment")
            .with_level(LogSeverity::Error)
            .with_contains("timeout")
            .with_from(now())
            .with_to(now())
            .older_than_days(30);
        let qb = select_records(&table(), &filter, Page::new(20, 40), now());
        assert_eq!(
            qb.sql(),
            "SELECT id, logged_at, level, source, message FROM shop_logs \
             WHERE source = $1 AND level = $2 AND message ILIKE $3 ESCAPE '\\' \
             AND logged_at >= $4 AND logged_at <= $5 AND logged_at < $6 \
             ORDER BY logged_at DESC, id DESC LIMIT $7 OFFSET $8"
        );
    }

    #[test]
    fn offset_without_limit() {
        let qb = select_records(&table(), &LogFilter::new(), Page::new(0, 15), now());
        assert!(qb.sql().ends_with("ORDER BY logged_at DESC, id DESC OFFSET $1"));
    }

    #[test]
    fn values_never_reach_statement_text() {
        let hostile = "x'; DROP TABLE shop_logs; --";
        let filter = LogFilter::new()
            .with_source(hostile)
            .with_contains(hostile);
        for sql in [
            select_records(&table(), &filter, Page::first(5), now()).sql().to_string(),
            count_records(&table(), &filter, now()).sql().to_string(),
            delete_records(&table(), &filter, now()).sql().to_string(),
        ] {
            assert!(!sql.contains("DROP"), "{sql}");
            assert!(sql.contains("source = $1"), "{sql}");
        }
    }

    #[test]
    fn count_and_delete_share_predicates() {
        let filter = LogFilter::new().with_level(LogSeverity::Debug).older_than_days(7);
        assert_eq!(
            count_records(&table(), &filter, now()).sql(),
            "SELECT COUNT(*) FROM shop_logs WHERE level = $1 AND logged_at < $2"
        );
        assert_eq!(
            delete_records(&table(), &filter, now()).sql(),
            "DELETE FROM shop_logs WHERE level = $1 AND logged_at < $2"
        );
        assert_eq!(
            delete_records(&table(), &LogFilter::new(), now()).sql(),
            "DELETE FROM shop_logs"
        );
    }

    #[test]
    fn statistics_statements() {
        assert_eq!(
            group_counts(&table()).sql(),
            "SELECT level, source, COUNT(*) AS count FROM shop_logs GROUP BY level, source"
        );
        assert_eq!(
            count_since(&table(), now()).sql(),
            "SELECT COUNT(*) FROM shop_logs WHERE logged_at >= $1"
        );
    }

    #[test]
    fn severity_compared_by_exact_column_value() {
        let filter = LogFilter::new().with_level(LogSeverity::Warning);
        let sql = count_records(&table(), &filter, now()).sql().to_string();
        assert_eq!(sql, "SELECT COUNT(*) FROM shop_logs WHERE level = $1");
        assert!(!sql.contains("lower("));
    }

    #[test]
    fn huge_age_builds_without_panicking() {
        let filter = LogFilter::new().older_than_days(u32::MAX);
        assert_eq!(
            count_records(&table(), &filter, now()).sql(),
            "SELECT COUNT(*) FROM shop_logs WHERE logged_at < $1"
        );
    }

    #[test]
    fn like_wildcards_escaped() {
        assert_eq!(like_pattern("disk"), "%disk%");
        assert_eq!(like_pattern("100%_done\\"), "%100\\%\\_done\\\\%");
    }
}
