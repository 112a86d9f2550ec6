// BioBloom: Bloom filter based read classification
//
// Builds Bloom filters from the k-mers of indexed reference sequences and
// classifies reads against many filters at once.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bloom;
pub mod builder;
pub mod classify;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod hasher;
pub mod multi_filter;
pub mod results;
pub mod sequence_index;
pub mod windowed_reader;

#[cfg(test)]
mod testing;

// Re-export common types at crate root
pub use bloom::{BloomFilter, FilterInfo};
pub use builder::{BuildConfiguration, FilterBuilder};
pub use classify::{categorize_pairs, categorize_reads, load_filter_set, ClassifyConfiguration, ReadClassifier};
pub use error::{BloomError, Result};
pub use multi_filter::FilterSet;
pub use results::{Classification, ResultAggregator, Summary, SummaryRow};
pub use sequence_index::{SequenceIndex, SequenceIndexEntry};
pub use windowed_reader::WindowedSequenceReader;

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
