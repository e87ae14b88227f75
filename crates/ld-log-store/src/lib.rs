//! Structured log store accessor for logdesk.
//!
//! Queries, counts, purges and summarizes records of a single log table.
//! [`PgLogStore`] runs against PostgreSQL with every filter value bound as
//! a parameter; [`MemoryLogStore`] applies the same filter semantics to an
//! in-process `Vec` for development and tests.

pub mod db;
pub mod error;
pub mod memory;
pub mod sql;
pub mod store;
pub mod types;

pub use db::{PgLogStore, connect};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryLogStore;
pub use sql::LogTable;
pub use store::{DEFAULT_STATS_WINDOW_HOURS, LogStore, default_stats_window, window_start};
pub use types::{
    GroupCount, LogFilter, LogRecord, LogSeverity, LogStatistics, MAX_OLDER_THAN_DAYS, Page,
    sort_newest_first,
};
