//! Unified error type for the admin facade.

use ld_log_files::LogError;
use ld_log_store::StoreError;

/// Failure from either log component.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Files(#[from] LogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias.
pub type AdminResult<T> = Result<T, AdminError>;
