use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::info::FilterInfo;
use crate::constants::{is_valid_k, INFO_EXTENSION};
use crate::encoding::prep_kmer;
use crate::error::{BloomError, Result};
use crate::hasher;

/// A Bloom filter over fixed-length k-mers.
///
/// Bits live in `AtomicU64` words, so [`insert`](Self::insert) and
/// [`contains`](Self::contains) take `&self` and may be called from many
/// threads at once. A concurrent `contains` racing with an `insert` of the
/// same k-mer may observe a partially set hash vector; callers that need
/// exact counts must not insert the same k-mer from two threads at once
/// and rely on the result.
pub struct BloomFilter {
    /// Total number of bits (m)
    size: u64,
    /// Number of hash functions (h)
    hash_num: usize,
    /// Length of the k-mers stored in the filter
    kmer_size: usize,
    /// Whether k-mers are canonicalized before hashing
    canonical: bool,
    /// Bit array, ceil(size / 64) words
    words: Vec<AtomicU64>,
}

impl BloomFilter {
    /// Create an empty filter.
    ///
    /// # Panics
    ///
    /// Panics if `size_bits` is zero.
    pub fn new(size_bits: u64, hash_num: usize, kmer_size: usize) -> Self {
        assert!(size_bits > 0, "Bloom filter size must be positive");
        let num_words = size_bits.div_ceil(64) as usize;
        let mut words = Vec::with_capacity(num_words);
        words.resize_with(num_words, || AtomicU64::new(0));
        Self {
            size: size_bits,
            hash_num,
            kmer_size,
            canonical: false,
            words,
        }
    }

    /// Enable or disable strand-independent (canonical) k-mer hashing
    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// Filter size in bits
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of hash functions
    pub fn hash_num(&self) -> usize {
        self.hash_num
    }

    /// K-mer length
    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    /// Whether k-mers are canonicalized before hashing
    pub fn canonical(&self) -> bool {
        self.canonical
    }

    /// Hash a raw k-mer with this filter's parameters.
    ///
    /// Returns `None` if the k-mer has the wrong length or contains a
    /// symbol outside A/C/G/T.
    #[inline]
    pub fn multi_hash(&self, kmer: &[u8]) -> Option<Vec<u64>> {
        if kmer.len() != self.kmer_size {
            return None;
        }
        let code = prep_kmer(kmer, self.canonical)?;
        Some(hasher::multi_hash(code, self.kmer_size, self.hash_num))
    }

    #[inline]
    fn locate(&self, hash: u64) -> (usize, u64) {
        let bit = hash % self.size;
        ((bit >> 6) as usize, 1u64 << (bit & 63))
    }

    /// Set the bits addressed by a precomputed hash vector
    #[inline]
    pub fn insert(&self, hashes: &[u64]) {
        for &h in hashes {
            let (word, mask) = self.locate(h);
            self.words[word].fetch_or(mask, Ordering::Relaxed);
        }
    }

    /// Test the bits addressed by a precomputed hash vector
    #[inline]
    pub fn contains(&self, hashes: &[u64]) -> bool {
        hashes.iter().all(|&h| {
            let (word, mask) = self.locate(h);
            self.words[word].load(Ordering::Relaxed) & mask != 0
        })
    }

    /// Insert a raw k-mer; returns `false` if the k-mer was rejected
    pub fn insert_kmer(&self, kmer: &[u8]) -> bool {
        match self.multi_hash(kmer) {
            Some(hashes) => {
                self.insert(&hashes);
                true
            }
            None => false,
        }
    }

    /// Test a raw k-mer using this filter's own hashing.
    ///
    /// Invalid k-mers are never contained.
    pub fn contains_kmer(&self, kmer: &[u8]) -> bool {
        self.multi_hash(kmer)
            .is_some_and(|hashes| self.contains(&hashes))
    }

    /// Number of bits currently set
    pub fn bits_set(&self) -> u64 {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as u64)
            .sum()
    }

    /// Size in bytes of the serialized bit array
    pub fn num_bytes(&self) -> u64 {
        self.words.len() as u64 * 8
    }

    /// Write the bit array to `path`
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        for word in &self.words {
            writer.write_all(&word.load(Ordering::Relaxed).to_le_bytes())?;
        }
        writer.flush()?;
        debug!("Stored {} bytes of filter bits to {}", self.num_bytes(), path.display());
        Ok(())
    }

    /// Load a bit array written by [`store`](Self::store) using the
    /// parameters recorded in `info`
    pub fn load<P: AsRef<Path>>(path: P, info: &FilterInfo) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let expected = info.filter_size.div_ceil(64) * 8;
        let actual = file.metadata()?.len();
        if info.filter_size == 0 || actual != expected {
            return Err(BloomError::FilterSizeMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        if info.hash_num == 0 || !is_valid_k(info.kmer_size) {
            return Err(BloomError::InvalidFilterInfo {
                path: info_path_for(path),
                reason: format!(
                    "cannot load with hash_num={} kmer_size={}",
                    info.hash_num, info.kmer_size
                ),
            });
        }

        let filter = Self::new(info.filter_size, info.hash_num, info.kmer_size)
            .with_canonical(info.canonical);

        let mut reader = BufReader::new(file);
        let mut buf = [0u8; 8];
        for word in &filter.words {
            reader.read_exact(&mut buf)?;
            word.store(u64::from_le_bytes(buf), Ordering::Relaxed);
        }
        Ok(filter)
    }

    /// Load a filter together with its companion metadata file
    pub fn load_with_info<P: AsRef<Path>>(path: P) -> Result<(Self, FilterInfo)> {
        let path = path.as_ref();
        let info = FilterInfo::read(info_path_for(path))?;
        let filter = Self::load(path, &info)?;
        Ok((filter, info))
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("size", &self.size)
            .field("hash_num", &self.hash_num)
            .field("kmer_size", &self.kmer_size)
            .field("canonical", &self.canonical)
            .finish_non_exhaustive()
    }
}

/// Metadata path for a filter file: its last two characters become `txt`
///
/// `filters/human.bf` becomes `filters/human.txt`.
pub fn info_path_for<P: AsRef<Path>>(filter_path: P) -> PathBuf {
    let s = filter_path.as_ref().to_string_lossy();
    let mut cut = s.len().saturating_sub(2);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    PathBuf::from(format!("{}{INFO_EXTENSION}", &s[..cut]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_and_contains() {
        let filter = BloomFilter::new(1000, 3, 4);
        assert!(filter.insert_kmer(b"ACGT"));
        assert!(filter.contains_kmer(b"ACGT"));
        assert!(filter.contains_kmer(b"acgt"));
        assert!(!filter.contains_kmer(b"TTTT"));
    }

    #[test]
    fn test_invalid_kmers_rejected() {
        let filter = BloomFilter::new(1000, 3, 4);
        assert!(!filter.insert_kmer(b"ACGN"));
        assert!(!filter.insert_kmer(b"ACG"));
        assert_eq!(filter.bits_set(), 0);
        assert!(!filter.contains_kmer(b"ACGN"));
    }

    #[test]
    fn test_hash_vector_api_matches_kmer_api() {
        let filter = BloomFilter::new(4096, 4, 5);
        let hashes = filter.multi_hash(b"GATTA").unwrap();
        assert_eq!(hashes.len(), 4);
        filter.insert(&hashes);
        assert!(filter.contains_kmer(b"GATTA"));
    }

    #[test]
    fn test_canonical_filter_matches_both_strands() {
        let filter = BloomFilter::new(1000, 2, 4).with_canonical(true);
        filter.insert_kmer(b"TACG");
        assert!(filter.contains_kmer(b"CGTA"));
    }

    #[test]
    fn test_concurrent_inserts() {
        let filter = BloomFilter::new(1 << 16, 3, 8);
        let kmers: Vec<String> = (0..256u128)
            .map(|code| crate::encoding::decode_kmer(code * 97, 8))
            .collect();

        std::thread::scope(|s| {
            for chunk in kmers.chunks(64) {
                let filter = &filter;
                s.spawn(move || {
                    for kmer in chunk {
                        filter.insert_kmer(kmer.as_bytes());
                    }
                });
            }
        });

        for kmer in &kmers {
            assert!(filter.contains_kmer(kmer.as_bytes()));
        }
    }

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.bf");

        let filter = BloomFilter::new(1000, 3, 4);
        filter.insert_kmer(b"ACGT");
        filter.insert_kmer(b"GGCC");
        filter.store(&path).unwrap();

        let info = FilterInfo::new("ref", 4, 3, 1000);
        let loaded = BloomFilter::load(&path, &info).unwrap();
        assert_eq!(loaded.bits_set(), filter.bits_set());
        assert!(loaded.contains_kmer(b"ACGT"));
        assert!(loaded.contains_kmer(b"GGCC"));
    }

    #[test]
    fn test_load_size_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.bf");
        BloomFilter::new(1000, 3, 4).store(&path).unwrap();

        let info = FilterInfo::new("ref", 4, 3, 5000);
        let err = BloomFilter::load(&path, &info).unwrap_err();
        assert!(matches!(err, BloomError::FilterSizeMismatch { .. }));
    }

    #[test]
    fn test_load_huge_size_checked_before_allocating() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.bf");
        BloomFilter::new(1024, 3, 4).store(&path).unwrap();

        let info = FilterInfo::new("ref", 4, 3, u64::MAX);
        let err = BloomFilter::load(&path, &info).unwrap_err();
        assert!(matches!(
            err,
            BloomError::FilterSizeMismatch { actual: 128, .. }
        ));
    }

    #[test]
    fn test_load_with_info_rejects_zero_hash_num() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.bf");
        BloomFilter::new(1024, 3, 4).store(&path).unwrap();
        std::fs::write(
            info_path_for(&path),
            "[filter]\nfilter_size=1024\nhash_num=0\nkmer_size=4\n",
        )
        .unwrap();

        assert!(matches!(
            BloomFilter::load_with_info(&path),
            Err(BloomError::InvalidFilterInfo { .. })
        ));
        let info = FilterInfo::new("ref", 4, 0, 1024);
        assert!(matches!(
            BloomFilter::load(&path, &info),
            Err(BloomError::InvalidFilterInfo { .. })
        ));
    }

    #[test]
    fn test_info_path_for() {
        assert_eq!(info_path_for("filters/human.bf"), PathBuf::from("filters/human.txt"));
        assert_eq!(info_path_for("x.bf"), PathBuf::from("x.txt"));
    }
}
