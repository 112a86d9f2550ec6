use std::fmt;
use std::fs;
use std::path::Path;

use crate::constants::{is_valid_k, MAX_KMER_SIZE};
use crate::error::{BloomError, Result};

/// Parameters and build statistics stored next to a filter's bit array.
///
/// The file is plain text, one `key=value` per line under a `[filter]`
/// heading. `filter_size`, `hash_num` and `kmer_size` are required to
/// reload a filter; every other key is optional and unknown keys are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInfo {
    /// Name the filter is reported under
    pub filter_id: String,
    /// K-mer length
    pub kmer_size: usize,
    /// Number of hash functions
    pub hash_num: usize,
    /// Whether k-mers were canonicalized before hashing
    pub canonical: bool,
    /// Filter size in bits
    pub filter_size: u64,
    /// Upper bound on entries used to size the filter
    pub expected_entries: u64,
    /// Distinct entries actually inserted
    pub total_entries: u64,
    /// K-mers that were already present when inserted
    pub redundancy: u64,
    /// K-mers skipped because a subtraction filter contained them
    pub kmers_removed: u64,
    /// False positive rate the filter was sized for
    pub desired_fpr: f64,
    /// Sequence files the filter was built from
    pub sequence_sources: Vec<String>,
}

impl FilterInfo {
    /// Create metadata with the parameters needed to reload a filter
    pub fn new(filter_id: &str, kmer_size: usize, hash_num: usize, filter_size: u64) -> Self {
        Self {
            filter_id: filter_id.to_string(),
            kmer_size,
            hash_num,
            canonical: false,
            filter_size,
            expected_entries: 0,
            total_entries: 0,
            redundancy: 0,
            kmers_removed: 0,
            desired_fpr: 0.0,
            sequence_sources: Vec::new(),
        }
    }

    /// Estimated false positive rate given the entries actually inserted
    ///
    /// `(1 - e^(-h*n/m))^h`
    pub fn false_positive_rate(&self) -> f64 {
        if self.filter_size == 0 {
            return 1.0;
        }
        let h = self.hash_num as f64;
        let n = self.total_entries as f64;
        let m = self.filter_size as f64;
        (1.0 - (-h * n / m).exp()).powf(h)
    }

    /// Fraction of expected entries that turned out to be redundant
    pub fn redundancy_rate(&self) -> f64 {
        if self.expected_entries == 0 {
            return 0.0;
        }
        self.redundancy as f64 / self.expected_entries as f64
    }

    /// Write the metadata file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Read a metadata file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|reason| BloomError::InvalidFilterInfo {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut info = Self::new("", 0, 0, 0);
        let mut seen_size = false;
        let mut seen_hash = false;
        let mut seen_k = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(format!("expected key=value, got '{line}'"));
            };
            let (key, value) = (key.trim(), value.trim());
            let bad = |_: std::num::ParseIntError| format!("bad value for {key}: '{value}'");
            match key {
                "filter_id" => info.filter_id = value.to_string(),
                "kmer_size" => {
                    info.kmer_size = value.parse().map_err(bad)?;
                    seen_k = true;
                }
                "hash_num" => {
                    info.hash_num = value.parse().map_err(bad)?;
                    seen_hash = true;
                }
                "filter_size" => {
                    info.filter_size = value.parse().map_err(bad)?;
                    seen_size = true;
                }
                "canonical" => {
                    info.canonical = value
                        .parse()
                        .map_err(|_| format!("bad value for {key}: '{value}'"))?
                }
                "expected_entries" => info.expected_entries = value.parse().map_err(bad)?,
                "total_entries" => info.total_entries = value.parse().map_err(bad)?,
                "redundancy" => info.redundancy = value.parse().map_err(bad)?,
                "kmers_removed" => info.kmers_removed = value.parse().map_err(bad)?,
                "desired_fpr" => {
                    info.desired_fpr = value
                        .parse()
                        .map_err(|_| format!("bad value for {key}: '{value}'"))?
                }
                "sequence_sources" => {
                    info.sequence_sources = value
                        .split(';')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                }
                _ => {}
            }
        }

        for (seen, key) in [
            (seen_size, "filter_size"),
            (seen_hash, "hash_num"),
            (seen_k, "kmer_size"),
        ] {
            if !seen {
                return Err(format!("missing required key {key}"));
            }
        }
        if info.filter_size == 0 {
            return Err("filter_size must be positive".to_string());
        }
        if info.hash_num == 0 {
            return Err("hash_num must be positive".to_string());
        }
        if !is_valid_k(info.kmer_size) {
            return Err(format!(
                "kmer_size {} is outside 1..={MAX_KMER_SIZE}",
                info.kmer_size
            ));
        }
        Ok(info)
    }
}

impl fmt::Display for FilterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[filter]")?;
        writeln!(f, "filter_id={}", self.filter_id)?;
        writeln!(f, "kmer_size={}", self.kmer_size)?;
        writeln!(f, "hash_num={}", self.hash_num)?;
        writeln!(f, "canonical={}", self.canonical)?;
        writeln!(f, "filter_size={}", self.filter_size)?;
        writeln!(f, "expected_entries={}", self.expected_entries)?;
        writeln!(f, "total_entries={}", self.total_entries)?;
        writeln!(f, "redundancy={}", self.redundancy)?;
        writeln!(f, "kmers_removed={}", self.kmers_removed)?;
        writeln!(f, "desired_fpr={}", self.desired_fpr)?;
        writeln!(f, "false_positive_rate={}", self.false_positive_rate())?;
        writeln!(f, "sequence_sources={}", self.sequence_sources.join(";"))
    }
}
