//! Structured log store error types.

use thiserror::Error;

/// Errors that can occur while querying or purging the log store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed filter or configuration, e.g. an inverted date range.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The underlying storage engine failed to execute a statement.
    #[error("log store error: {0}")]
    Store(String),

    /// A stored row could not be turned into a record.
    #[error("undecodable log row {id}: {message}")]
    Decode { id: i64, message: String },
}

impl StoreError {
    /// Wrap a sqlx failure, logging it at the boundary.
    pub(crate) fn from_sqlx(context: &'static str) -> impl Fn(sqlx::Error) -> Self {
        move |e| {
            tracing::error!(error = %e, "{context} failed");
            Self::Store(format!("{context}: {e}"))
        }
    }
}

/// Convenience alias for log store results.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = StoreError::Validation("from is after to".into());
        assert_eq!(err.to_string(), "invalid request: from is after to");

        let err = StoreError::Decode {
            id: 7,
            message: "unknown severity 'loud'".into(),
        };
        assert_eq!(
            err.to_string(),
            "undecodable log row 7: unknown severity 'loud'"
        );
    }

    #[test]
    fn sqlx_errors_become_store_errors() {
        let err = StoreError::from_sqlx("count")(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Store(ref msg) if msg.starts_with("count: ")));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
