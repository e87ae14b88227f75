//! Shared test harness for E2E integration tests.
//!
//! Wires a `LogAdmin` over a scratch log directory on the real filesystem
//! and an in-memory record store, exercising real code paths across all
//! crate boundaries.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use ld_admin::{AdminConfig, LogAdmin};
use ld_log_files::LogFileEngine;
use ld_log_store::{LogRecord, LogSeverity, MemoryLogStore};

/// End-to-end harness: temp log directory + in-memory store behind one facade.
pub struct TestHarness {
    /// Scratch root; the log directory is `root/logs`.
    pub root: TempDir,
    /// Log directory every file operation is confined to.
    pub log_dir: PathBuf,
    /// Structured store shared with the facade.
    pub store: Arc<MemoryLogStore>,
    pub admin: LogAdmin,
}

impl TestHarness {
    /// Empty log directory, empty store.
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let log_dir = root.path().join("logs");
        std::fs::create_dir(&log_dir).unwrap();

        let config = AdminConfig {
            log_dir: log_dir.clone(),
            ..AdminConfig::default()
        };
        let store = Arc::new(MemoryLogStore::new());
        let admin = LogAdmin::new(
            LogFileEngine::local(config.log_files()),
            store.clone(),
            config.stats_window(),
        );

        Self {
            root,
            log_dir,
            store,
            admin,
        }
    }

    /// Harness with a small shop deployment: two log files and six records.
    pub async fn with_sample_data() -> Self {
        let h = Self::new();
        h.write_lines(
            "shop.log",
            &[
                "2024-01-15 12:00:01 INFO Checkout page rendered",
                "2024-01-15 12:00:05 ERROR: disk full while writing order cache",
                "",
                "2024-01-15 12:00:10 WARNING Payment gateway slow (2300ms)",
                "2024-01-15 12:00:15 INFO Order 1042 placed",
                "2024-01-15 12:00:20 error retrying payment webhook",
            ],
        );
        h.write_lines("cron.log", &["2024-01-15 03:00:00 INFO Nightly cleanup finished"]);
        h.write_file("README.txt", b"not a log\n");

        for (hours_ago, level, source, message) in [
            (72, LogSeverity::Info, "cron", "Nightly cleanup finished"),
            (50, LogSeverity::Warning, "payment", "Gateway responded slowly (2300ms)"),
            (30, LogSeverity::Error, "payment", "Gateway timeout after 30s"),
            (6, LogSeverity::Info, "checkout", "Order 1042 placed"),
            (3, LogSeverity::Error, "inventory", "Stock sync failed: SKU-88 missing"),
            (1, LogSeverity::Debug, "checkout", "Cart recalculated"),
        ] {
            h.insert(hours_ago, level, source, message).await;
        }
        h
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.log_dir.join(name)
    }

    pub fn write_file(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.path(name), bytes).unwrap();
    }

    /// Write `lines`, each newline-terminated.
    pub fn write_lines(&self, name: &str, lines: &[&str]) {
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        self.write_file(name, content.as_bytes());
    }

    /// Insert a record stamped `hours_ago` hours before now.
    pub async fn insert(
        &self,
        hours_ago: i64,
        level: LogSeverity,
        source: &str,
        message: &str,
    ) -> LogRecord {
        self.store
            .insert(Utc::now() - Duration::hours(hours_ago), level, source, message)
            .await
    }
}
