//! Error type shared by the library
//!
//! Configuration problems (missing index, incompatible filters, undersized
//! filters) are reported as values so the caller decides how to terminate.
//! Invalid k-mers are never errors; they are skipped where they occur.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while building filters or classifying reads
#[derive(Error, Debug)]
pub enum BloomError {
    /// The `.fai` index next to a sequence file does not exist
    #[error("Fasta files must be indexed, no index found at {}. Use samtools faidx.", path.display())]
    IndexMissing {
        /// Path of the expected index file
        path: PathBuf,
    },

    /// A line of a sequence index could not be parsed
    #[error("Malformed sequence index {} at line {line}: {reason}", path.display())]
    MalformedIndex {
        /// Index file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// The same identifier appears twice in one sequence index
    #[error("Duplicate sequence identifier '{0}' in index")]
    DuplicateSequence(String),

    /// An identifier was requested that the index does not contain
    #[error("Unknown sequence identifier '{0}'")]
    UnknownSequence(String),

    /// A filter name was requested that was never registered
    #[error("Filter '{0}' not found")]
    FilterNotFound(String),

    /// The subtraction filter uses longer k-mers than the filter being built
    #[error("Subtraction filter's k-mer size ({subtract}) is larger than output filter's k-mer size ({target})")]
    SubtractiveKmerTooLarge {
        /// k-mer size of the subtraction filter
        subtract: usize,
        /// k-mer size of the filter being built
        target: usize,
    },

    /// The subtraction filter uses a different k-mer size
    #[error("Must use identical size k-mers in subtractive filter (subtract={subtract}, target={target})")]
    KmerSizeMismatch {
        /// k-mer size of the subtraction filter
        subtract: usize,
        /// k-mer size of the filter being built
        target: usize,
    },

    /// The filter is not larger than the number of entries it must hold
    #[error("Filter size ({filter_size} bits) must exceed the expected number of entries ({expected_entries})")]
    FilterTooSmall {
        /// Requested filter size in bits
        filter_size: u64,
        /// Expected number of entries
        expected_entries: u64,
    },

    /// Filters loaded together do not share hash parameters
    #[error("Filter '{name}' is incompatible with the filter set: {reason}")]
    ParameterMismatch {
        /// Offending filter
        name: String,
        /// Which parameter differed
        reason: String,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A filter metadata file is missing a key or holds a bad value
    #[error("Invalid filter info {}: {reason}", path.display())]
    InvalidFilterInfo {
        /// Metadata file
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// A serialized bit array does not match its metadata
    #[error("Filter file {} holds {actual} bytes, expected {expected}", path.display())]
    FilterSizeMismatch {
        /// Bit array file
        path: PathBuf,
        /// Bytes implied by the metadata
        expected: u64,
        /// Bytes on disk
        actual: u64,
    },

    /// A summary was requested before any read was processed
    #[error("Cannot summarize results: no reads were processed")]
    NoReadsProcessed,

    /// The two files of a read pair do not have the same number of records
    #[error("Paired read files are out of sync: {0}")]
    PairedReadMismatch(String),

    /// Read input could not be parsed
    #[error("Failed to parse reads: {0}")]
    ReadParse(String),

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, BloomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_missing_message_mentions_faidx() {
        let err = BloomError::IndexMissing {
            path: PathBuf::from("/data/ref.fa.fai"),
        };
        let msg = err.to_string();
        assert!(msg.contains("samtools faidx"));
        assert!(msg.contains("/data/ref.fa.fai"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: BloomError = io_err.into();
        assert!(matches!(err, BloomError::Io(_)));
    }
}
