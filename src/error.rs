use std::fmt;

use crate::codec::CodecError;
use crate::cql::CqlError;

/// Error type for grain storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A conditional write or clear lost a race. Carries the grain id, the
    /// version the caller attempted against, and the version the column store
    /// reported as current. Never retried internally.
    Conflict {
        grain_id: String,
        attempted: String,
        current: String,
    },
    /// Connectivity, timeout, or protocol-level failure from the column store.
    /// Logged with grain context at the failure site and re-raised unchanged.
    Driver(String),
    /// Keyspace or table could not be verified or created during bootstrap.
    /// Fatal to startup; the store must not be used in this state.
    Provisioning(String),
    /// Value encode/decode failure.
    Codec(String),
    /// Provisioning was interrupted by the caller's cancellation token.
    Cancelled,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Conflict {
                grain_id,
                attempted,
                current,
            } => write!(
                f,
                "state of grain '{}' cannot be updated due to concurrency (attempted version '{}', current version '{}')",
                grain_id, attempted, current
            ),
            StorageError::Driver(msg) => write!(f, "column store driver error: {}", msg),
            StorageError::Provisioning(msg) => write!(f, "storage provisioning failed: {}", msg),
            StorageError::Codec(msg) => write!(f, "state codec error: {}", msg),
            StorageError::Cancelled => write!(f, "storage operation cancelled"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<CqlError> for StorageError {
    fn from(err: CqlError) -> Self {
        StorageError::Driver(err.to_string())
    }
}

impl From<CodecError> for StorageError {
    fn from(err: CodecError) -> Self {
        StorageError::Codec(err.to_string())
    }
}
