//! Failures of the character store and the action logs.

use std::path::PathBuf;

use combat_core::{CombatError, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A writer panicked while holding the named lock.
    #[error("{store} lock was poisoned")]
    LockPoisoned { store: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("record of {0} bytes exceeds the log frame limit")]
    RecordTooLarge(usize),

    /// The log ends inside a record, typically after a crash mid-append.
    #[error("record at offset {offset} is truncated (expected {expected} bytes)")]
    TruncatedRecord { offset: u64, expected: u32 },

    #[error("action log already exists: {}", .0.display())]
    LogAlreadyExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

impl CombatError for RepositoryError {
    fn category(&self) -> ErrorCategory {
        match self {
            RepositoryError::LogAlreadyExists(_) => ErrorCategory::State,
            _ => ErrorCategory::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::LockPoisoned { .. } => "REPOSITORY_LOCK_POISONED",
            RepositoryError::Io(_) => "REPOSITORY_IO",
            RepositoryError::Codec(_) => "REPOSITORY_CODEC",
            RepositoryError::RecordTooLarge(_) => "REPOSITORY_RECORD_TOO_LARGE",
            RepositoryError::TruncatedRecord { .. } => "REPOSITORY_TRUNCATED_RECORD",
            RepositoryError::LogAlreadyExists(_) => "REPOSITORY_LOG_EXISTS",
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_io_failures_are_retryable() {
        let io = RepositoryError::from(std::io::Error::other("disk unplugged"));
        assert!(io.is_retryable());
        assert_eq!(io.category(), ErrorCategory::Internal);

        let truncated = RepositoryError::TruncatedRecord {
            offset: 40,
            expected: 12,
        };
        assert!(!truncated.is_retryable());
        assert_eq!(truncated.error_code(), "REPOSITORY_TRUNCATED_RECORD");

        let exists = RepositoryError::LogAlreadyExists(PathBuf::from("actions.log"));
        assert_eq!(exists.category(), ErrorCategory::State);
        assert_eq!(exists.to_string(), "action log already exists: actions.log");
    }
}
