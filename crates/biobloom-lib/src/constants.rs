//! Constants and defaults for BioBloom
//!
//! Defaults used by the builder, the windowed reader and the classifier,
//! plus the sentinel labels written to classification summaries.

/// Label reported for reads hitting more than one filter.
///
/// Downstream tooling matches this string verbatim.
pub const MULTI_MATCH: &str = "multiMatch";

/// Label reported for reads hitting no filter.
///
/// Downstream tooling matches this string verbatim.
pub const NO_MATCH: &str = "noMatch";

/// Default number of bases buffered per block by the windowed reader
pub const DEFAULT_BLOCK_SIZE: usize = 100_000;

/// Default k-mer length
pub const DEFAULT_KMER_SIZE: usize = 25;

/// Largest k-mer length that fits the 128-bit packed encoding
pub const MAX_KMER_SIZE: usize = 64;

/// Default target false positive rate when sizing a new filter
pub const DEFAULT_FPR: f64 = 0.02;

/// Default fraction of a read's k-mers that must hit a filter
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.15;

/// Default number of records pulled from a read stream per lock
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Extension of the companion sequence index file
pub const FASTA_INDEX_EXTENSION: &str = "fai";

/// Extension used for filter bit arrays written by the CLI
pub const FILTER_EXTENSION: &str = "bf";

/// Extension used for filter metadata files
pub const INFO_EXTENSION: &str = "txt";

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Check if a k-mer size is supported
#[inline]
pub const fn is_valid_k(k: usize) -> bool {
    k >= 1 && k <= MAX_KMER_SIZE
}
