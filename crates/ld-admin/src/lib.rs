//! Log administration for logdesk.
//!
//! Loads [`AdminConfig`], installs tracing, and exposes both log sources
//! (structured records and flat files) through a single [`LogAdmin`].

pub mod admin;
pub mod config;
pub mod error;
pub mod telemetry;

pub use admin::{LogAdmin, LogReport};
pub use config::AdminConfig;
pub use error::{AdminError, AdminResult};
