//! Error types for the infraction ledger
//!
//! This module defines the errors that can occur while recording or loading warnings.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the ledger's storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The ledger file could not be read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger file exists but does not parse
    #[error("Corrupt ledger file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The in-memory ledger could not be encoded
    #[error("Failed to encode ledger: {0}")]
    Encode(#[source] serde_yaml::Error),
}

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store could not be read or written
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StorageError),

    /// An identifier or reason was rejected before any mutation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LedgerError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether this error came from the storage backend
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = LedgerError::invalid("reason must not be empty");
        assert_eq!(error.to_string(), "Invalid input: reason must not be empty");
        assert!(!error.is_storage_failure());

        let error = LedgerError::from(StorageError::Io {
            path: PathBuf::from("data/infractions.yaml"),
            source: std::io::Error::other("disk full"),
        });
        assert!(error.is_storage_failure());
        assert_eq!(
            error.to_string(),
            "Storage failure: I/O error on data/infractions.yaml: disk full"
        );
    }

    #[test]
    fn test_corrupt_error_keeps_source() {
        let source = serde_yaml::from_str::<Vec<u64>>("[1, two").unwrap_err();
        let error = StorageError::Corrupt {
            path: PathBuf::from("ledger.yaml"),
            source,
        };
        assert!(error.to_string().starts_with("Corrupt ledger file ledger.yaml:"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
