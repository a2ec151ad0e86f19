//! Thought Link Storage Layer
//!
//! RocksDB-backed implementation of the `MiningStore` trait from
//! `thought-link-core`.
//!
//! # Architecture
//! - `column_families`: the 7 column families and their tuned options
//! - `schema`: fixed-size big-endian key builders and parsers
//! - `config`: store configuration (cache size, WAL, open files)
//! - `store`: the `RocksDbMiningStore` implementation
//!
//! Values are bincode with a one-byte storage-version prefix; keys are
//! fixed-size so every scan the miner issues is a bounded range scan.

pub mod column_families;
pub mod config;
pub mod error;
pub mod schema;
pub mod store;

#[cfg(test)]
mod tests;

pub use column_families::{cf_names, get_cf_descriptors, ALL_CFS, CF_COUNT};
pub use config::MiningStoreConfig;
pub use error::{MiningStoreError, MiningStoreResult, STORAGE_VERSION};
pub use store::{RocksDbMiningStore, StoreHealth};
