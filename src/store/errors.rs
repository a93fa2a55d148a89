//! Store error types
//!
//! Error codes:
//! - NC_STORE_IO (ERROR severity)
//! - NC_STORE_CORRUPTION (FATAL severity)
//! - NC_STORE_SERIALIZATION (ERROR severity)
//! - NC_STORE_NOT_FOUND (ERROR severity)
//! - NC_STORE_IMMUTABLE_FIELD (ERROR severity)
//! - NC_STORE_CHAIN_CONFLICT (ERROR severity)
//! - NC_STORE_POISONED (FATAL severity)
//! - NC_STORE_LOCKED (ERROR severity)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::incident::IncidentId;

/// Persistence failures. Propagated unchanged by every caller in the core.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store file corrupted: {0}")]
    Corruption(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("incident {0} not found")]
    IncidentNotFound(IncidentId),

    #[error("incident {id}: field '{field}' is immutable")]
    ImmutableField { id: IncidentId, field: &'static str },

    #[error("chain conflict: tip is {expected:?}, entry links to {provided:?}")]
    ChainConflict {
        expected: Option<String>,
        provided: Option<String>,
    },

    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),

    #[error("store is in use by another handle (lock held on {0})")]
    Locked(PathBuf),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "NC_STORE_IO",
            StoreError::Corruption(_) => "NC_STORE_CORRUPTION",
            StoreError::Serialization(_) => "NC_STORE_SERIALIZATION",
            StoreError::IncidentNotFound(_) => "NC_STORE_NOT_FOUND",
            StoreError::ImmutableField { .. } => "NC_STORE_IMMUTABLE_FIELD",
            StoreError::ChainConflict { .. } => "NC_STORE_CHAIN_CONFLICT",
            StoreError::Poisoned(_) => "NC_STORE_POISONED",
            StoreError::Locked(_) => "NC_STORE_LOCKED",
        }
    }

    /// Fatal errors mean the store can no longer be trusted in this process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Corruption(_) | StoreError::Poisoned(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_is_fatal() {
        assert!(StoreError::Corruption("bad checksum".into()).is_fatal());
        assert!(StoreError::Poisoned("state").is_fatal());
    }

    #[test]
    fn test_io_is_not_fatal() {
        let err = StoreError::io(
            "/tmp/x",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(!err.is_fatal());
        assert_eq!(err.code(), "NC_STORE_IO");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_chain_conflict_display() {
        let err = StoreError::ChainConflict {
            expected: Some("aa".into()),
            provided: None,
        };
        assert_eq!(err.code(), "NC_STORE_CHAIN_CONFLICT");
        assert!(err.to_string().contains("aa"));
    }
}
