//! Error types for the RocksDB mining store.

use thiserror::Error;

use thought_link_core::CoreError;

/// Version byte prefixed to every stored value.
pub const STORAGE_VERSION: u8 = 1;

/// Storage operation errors.
///
/// Every failed RocksDB operation carries the operation name, the column
/// family involved, and the key being accessed, so failures are debuggable
/// without re-running.
#[derive(Debug, Error)]
pub enum MiningStoreError {
    /// RocksDB operation failed.
    #[error("RocksDB {operation} failed on CF '{cf}' with key '{key:?}': {source}")]
    RocksDbOperation {
        operation: &'static str,
        cf: &'static str,
        key: Option<String>,
        #[source]
        source: rocksdb::Error,
    },

    /// Database failed to open.
    #[error("Failed to open RocksDB at '{path}': {message}")]
    OpenFailed { path: String, message: String },

    /// Column family not found (should never happen if the DB opened).
    #[error("Column family '{name}' not found in database")]
    ColumnFamilyNotFound { name: String },

    /// Serialization error.
    #[error("Serialization error for {type_name}: {message}")]
    Serialization {
        type_name: &'static str,
        message: String,
    },

    /// Deserialization error (corrupt or foreign data).
    #[error("Deserialization error for key '{key}' in CF '{cf}': {message}")]
    Deserialization {
        cf: &'static str,
        key: String,
        message: String,
    },

    /// Stored value carries an unexpected storage version.
    #[error("Version mismatch in CF '{cf}': expected {expected}, got {actual}")]
    VersionMismatch {
        cf: &'static str,
        expected: u8,
        actual: u8,
    },

    /// Requested record does not exist.
    #[error("{what} not found for key '{key}'")]
    NotFound { what: &'static str, key: String },

    /// A secondary index entry points at a missing primary record.
    #[error("Index corruption in CF '{cf}': {message}")]
    IndexCorrupted { cf: &'static str, message: String },

    /// Record failed domain validation before storage.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl MiningStoreError {
    /// Create a RocksDB operation error.
    pub(crate) fn rocksdb_op(
        operation: &'static str,
        cf: &'static str,
        key: Option<&str>,
        source: rocksdb::Error,
    ) -> Self {
        Self::RocksDbOperation {
            operation,
            cf,
            key: key.map(String::from),
            source,
        }
    }
}

/// Result type for mining store operations.
pub type MiningStoreResult<T> = Result<T, MiningStoreError>;

impl From<MiningStoreError> for CoreError {
    fn from(err: MiningStoreError) -> Self {
        CoreError::Storage {
            message: err.to_string(),
        }
    }
}
