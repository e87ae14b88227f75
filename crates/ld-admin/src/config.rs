//! Log administration configuration, loadable from TOML or environment.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Duration;
use serde::Deserialize;

use ld_log_files::{Highlight, LogFilesConfig};
use ld_log_store::MAX_OLDER_THAN_DAYS;

/// Longest accepted `stats_window_hours`, matching the store's age limit.
pub const MAX_STATS_WINDOW_HOURS: u32 = MAX_OLDER_THAN_DAYS * 24;

/// Top-level configuration for [`LogAdmin`](crate::LogAdmin).
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Directory holding the flat log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Extensions recognized as log files, without the leading dot.
    #[serde(default = "default_log_extensions")]
    pub log_extensions: Vec<String>,
    /// Bytes read per step when tailing.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_highlight_open")]
    pub highlight_open: String,
    #[serde(default = "default_highlight_close")]
    pub highlight_close: String,
    /// PostgreSQL connection URL. None keeps records in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Table holding structured log records.
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Rolling window for the "recent" record count, in hours.
    #[serde(default = "default_stats_window_hours")]
    pub stats_window_hours: u32,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_extensions() -> Vec<String> {
    vec!["log".to_string()]
}

fn default_chunk_size() -> usize {
    4096
}

fn default_highlight_open() -> String {
    "<mark>".to_string()
}

fn default_highlight_close() -> String {
    "</mark>".to_string()
}

fn default_table_name() -> String {
    "app_logs".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_stats_window_hours() -> u32 {
    24
}

impl AdminConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("parsing config {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `LOGDESK_*` environment variables and `DATABASE_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each known key.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup("LOGDESK_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(table) = lookup("LOGDESK_LOG_TABLE") {
            config.table_name = table;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            config.database_url = Some(url);
        }
        if let Some(hours) = lookup("LOGDESK_STATS_WINDOW_HOURS") {
            config.stats_window_hours = hours
                .trim()
                .parse()
                .with_context(|| format!("LOGDESK_STATS_WINDOW_HOURS={hours:?}"))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the components cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.stats_window_hours <= MAX_STATS_WINDOW_HOURS,
            "stats_window_hours {} exceeds {MAX_STATS_WINDOW_HOURS}",
            self.stats_window_hours
        );
        Ok(())
    }

    /// Flat-file engine settings.
    pub fn log_files(&self) -> LogFilesConfig {
        LogFilesConfig {
            log_dir: self.log_dir.clone(),
            extensions: self.log_extensions.clone(),
            chunk_size: self.chunk_size,
            highlight: Highlight {
                open: self.highlight_open.clone(),
                close: self.highlight_close.clone(),
            },
        }
    }

    pub fn stats_window(&self) -> Duration {
        Duration::hours(i64::from(self.stats_window_hours))
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_extensions: default_log_extensions(),
            chunk_size: default_chunk_size(),
            highlight_open: default_highlight_open(),
            highlight_close: default_highlight_close(),
            database_url: None,
            table_name: default_table_name(),
            max_connections: default_max_connections(),
            stats_window_hours: default_stats_window_hours(),
        }
    }
}
