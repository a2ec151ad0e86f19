//! RocksDB column family definitions for the mining store.
//!
//! # Column Families (7 total)
//! | Name | Purpose | Key Format | Value |
//! |------|---------|------------|-------|
//! | thoughts | Thought units by id | id (8 bytes BE) | ThoughtUnit |
//! | sampling_index | Sampling-key order index | key bits (8 BE) + id (8 BE) | empty |
//! | candidates | Candidate pairs | id_a (8 BE) + id_b (8 BE), a < b | CandidatePair |
//! | mining_progress | One row per mining run | run uuid (16 bytes) | MiningProgress |
//! | similarity_samples | Sketch observation pool | run uuid (16) + seq (8 BE) | SimilaritySample |
//! | sample_runs | Sketch run registry | run uuid (16 bytes) | first-append timestamp |
//! | distribution | Singleton summary cache | "current" (7 bytes) | DistributionSummary |
//!
//! All option builders are infallible at construction time; errors only
//! surface when the DB opens.

use rocksdb::{BlockBasedOptions, Cache, ColumnFamilyDescriptor, Options};

/// Thought units keyed by id. The miner's keyset pages scan this CF.
pub const CF_THOUGHTS: &str = "thoughts";

/// Secondary index ordering thought ids by sampling key.
/// Key: sampling-key f64 bits (8 bytes BE, non-negative so bit order equals
/// numeric order) + thought id (8 bytes BE). Value: empty.
pub const CF_SAMPLING_INDEX: &str = "sampling_index";

/// Candidate pairs keyed by the unordered pair (smaller id first).
pub const CF_CANDIDATES: &str = "candidates";

/// Mining progress rows keyed by run uuid.
pub const CF_MINING_PROGRESS: &str = "mining_progress";

/// Similarity sample pool keyed by run uuid + append sequence.
pub const CF_SIMILARITY_SAMPLES: &str = "similarity_samples";

/// Sketch run registry: run uuid -> first-append timestamp. Keeps `latest`
/// resolution and age-based pruning from scanning the whole sample pool.
pub const CF_SAMPLE_RUNS: &str = "sample_runs";

/// Singleton distribution summary cache.
pub const CF_DISTRIBUTION: &str = "distribution";

/// All column family names (7 total).
pub const ALL_CFS: &[&str] = &[
    CF_THOUGHTS,
    CF_SAMPLING_INDEX,
    CF_CANDIDATES,
    CF_MINING_PROGRESS,
    CF_SIMILARITY_SAMPLES,
    CF_SAMPLE_RUNS,
    CF_DISTRIBUTION,
];

/// Total count of column families.
pub const CF_COUNT: usize = 7;

/// Re-export of the CF name constants as a namespace, matching how
/// consumers refer to them.
pub mod cf_names {
    pub use super::{
        CF_CANDIDATES, CF_DISTRIBUTION, CF_MINING_PROGRESS, CF_SAMPLE_RUNS, CF_SAMPLING_INDEX,
        CF_SIMILARITY_SAMPLES, CF_THOUGHTS,
    };
}

/// Options for point-lookup CFs (thoughts, candidates, progress,
/// distribution): bloom filters, cached index/filter blocks.
fn point_lookup_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts.create_if_missing(true);
    opts
}

/// Options for range-scan CFs (sampling index, similarity samples): no
/// bloom filter, larger blocks for sequential reads.
fn range_scan_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_block_size(32 * 1024);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
    opts.create_if_missing(true);
    opts
}

/// Options for tiny CFs (sample run registry, singleton cache): no
/// compression, point lookups.
fn small_cf_options(cache: &Cache) -> Options {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    block_opts.set_bloom_filter(10.0, false);

    let mut opts = Options::default();
    opts.set_block_based_table_factory(&block_opts);
    opts.set_compression_type(rocksdb::DBCompressionType::None);
    opts.create_if_missing(true);
    opts
}

/// Column family descriptors with tuned options, sharing one block cache.
pub fn get_cf_descriptors(cache: &Cache) -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_THOUGHTS, point_lookup_options(cache)),
        ColumnFamilyDescriptor::new(CF_SAMPLING_INDEX, range_scan_options(cache)),
        ColumnFamilyDescriptor::new(CF_CANDIDATES, point_lookup_options(cache)),
        ColumnFamilyDescriptor::new(CF_MINING_PROGRESS, point_lookup_options(cache)),
        ColumnFamilyDescriptor::new(CF_SIMILARITY_SAMPLES, range_scan_options(cache)),
        ColumnFamilyDescriptor::new(CF_SAMPLE_RUNS, small_cf_options(cache)),
        ColumnFamilyDescriptor::new(CF_DISTRIBUTION, small_cf_options(cache)),
    ]
}
