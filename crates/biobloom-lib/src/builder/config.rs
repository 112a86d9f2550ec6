//! Build configuration for Bloom filter construction
//!
//! Holds the filter parameters (k-mer length, hash count, strand handling)
//! and the resources used while building, plus the usual sizing formulas
//! for a target false positive rate.

use crate::constants::{is_valid_k, DEFAULT_BLOCK_SIZE, DEFAULT_FPR, DEFAULT_KMER_SIZE, MAX_KMER_SIZE};

/// Configuration parameters for building a Bloom filter
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// K-mer length (1..=64)
    pub kmer_size: usize,

    /// Number of hash functions per k-mer
    pub hash_num: usize,

    /// Hash k-mers and their reverse complements to the same bits
    pub canonical: bool,

    /// Number of threads for parallel operations (0 = all available cores)
    pub num_threads: usize,

    /// Bases buffered per block by each windowed reader
    pub block_size: usize,

    /// False positive rate used to size the filter when no size is given
    pub desired_fpr: f64,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            kmer_size: DEFAULT_KMER_SIZE,
            hash_num: Self::optimal_hash_num(DEFAULT_FPR),
            canonical: false,
            num_threads: 0, // 0 = use all available cores
            block_size: DEFAULT_BLOCK_SIZE,
            desired_fpr: DEFAULT_FPR,
        }
    }
}

impl BuildConfiguration {
    /// Create a configuration with the given k-mer length and hash count
    pub fn new(kmer_size: usize, hash_num: usize) -> Result<Self, String> {
        let config = Self {
            kmer_size,
            hash_num,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_k(self.kmer_size) {
            return Err(format!(
                "k-mer size must be in range [1, {MAX_KMER_SIZE}], got k={}",
                self.kmer_size
            ));
        }
        if self.hash_num == 0 {
            return Err("number of hash functions must be positive".to_string());
        }
        if self.block_size == 0 {
            return Err("block size must be positive".to_string());
        }
        if !(self.desired_fpr > 0.0 && self.desired_fpr < 1.0) {
            return Err(format!(
                "false positive rate must be in (0, 1), got {}",
                self.desired_fpr
            ));
        }
        Ok(())
    }

    /// Number of bits for `entries` elements at false positive rate `fpr`
    ///
    /// `ceil(-n ln p / (ln 2)^2)`, rounded up to whole 64-bit words.
    pub fn optimal_filter_size(entries: u64, fpr: f64) -> u64 {
        let ln2 = std::f64::consts::LN_2;
        let bits = (-(entries as f64) * fpr.ln() / (ln2 * ln2)).ceil() as u64;
        bits.max(1).div_ceil(64) * 64
    }

    /// Number of hash functions minimizing the false positive rate `fpr`
    pub fn optimal_hash_num(fpr: f64) -> usize {
        (-fpr.log2()).round().max(1.0) as usize
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Build Configuration:");
        tracing::info!("  kmer_size = {}", self.kmer_size);
        tracing::info!("  hash_num = {}", self.hash_num);
        tracing::info!("  canonical = {}", self.canonical);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        tracing::debug!("  block_size = {}", self.block_size);
        tracing::debug!("  desired_fpr = {}", self.desired_fpr);
    }
}
