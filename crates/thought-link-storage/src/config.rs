//! Mining store configuration.

/// Configuration for opening a [`RocksDbMiningStore`](crate::RocksDbMiningStore).
#[derive(Clone, Debug)]
pub struct MiningStoreConfig {
    /// Shared block cache size in bytes.
    pub block_cache_size: usize,
    /// Maximum open files handed to RocksDB.
    pub max_open_files: i32,
    /// Create the database if it does not exist.
    pub create_if_missing: bool,
    /// Write-ahead log. Disable only for bulk loads where losing the tail
    /// on crash is acceptable.
    pub enable_wal: bool,
}

impl Default for MiningStoreConfig {
    fn default() -> Self {
        Self {
            block_cache_size: 64 * 1024 * 1024,
            max_open_files: 500,
            create_if_missing: true,
            enable_wal: true,
        }
    }
}
