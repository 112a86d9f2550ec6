//! In-memory FASTA index (`.fai`)
//!
//! Each line of an index describes one sequence record:
//!
//! ```text
//! chr1    248956422    6    60    61
//! chr2    242193529    253105758    60    61
//! ```
//!
//! The columns are the identifier, the number of bases, the byte offset of
//! the first base, the number of bases per line and the number of bytes per
//! line (bases plus line terminator). Further columns (FASTQ indexes) are
//! ignored. Records keep the order in which they appear in the index.

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::constants::FASTA_INDEX_EXTENSION;
use crate::error::{BloomError, Result};

/// One record of a FASTA index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceIndexEntry {
    /// Sequence identifier (first word of the FASTA header)
    pub identifier: String,
    /// Number of bases in the sequence
    pub total_length: u64,
    /// Byte offset of the first base in the FASTA file
    pub byte_offset: u64,
    /// Bases per full line
    pub line_length: u64,
    /// Bytes per full line, including the terminator
    pub chars_per_line: u64,
    /// Position of the record within the index
    pub ordinal: usize,
}

impl SequenceIndexEntry {
    /// Number of lines holding the sequence
    pub fn num_lines(&self) -> u64 {
        if self.line_length == 0 {
            return 0;
        }
        self.total_length.div_ceil(self.line_length)
    }
}

/// Index of all records in one FASTA file, loaded once
#[derive(Debug, Clone, Default)]
pub struct SequenceIndex {
    entries: Vec<SequenceIndexEntry>,
    by_identifier: AHashMap<String, usize>,
}

impl SequenceIndex {
    /// Path of the index that accompanies a sequence file (`<path>.fai`)
    pub fn index_path_for<P: AsRef<Path>>(sequence_path: P) -> PathBuf {
        let mut name = sequence_path.as_ref().as_os_str().to_owned();
        name.push(".");
        name.push(FASTA_INDEX_EXTENSION);
        PathBuf::from(name)
    }

    /// Load the index accompanying `sequence_path`
    ///
    /// # Errors
    /// [`BloomError::IndexMissing`] if there is no `.fai` next to the file;
    /// the index has to be created beforehand (`samtools faidx`).
    pub fn load_for<P: AsRef<Path>>(sequence_path: P) -> Result<Self> {
        let index_path = Self::index_path_for(sequence_path);
        if !index_path.is_file() {
            return Err(BloomError::IndexMissing { path: index_path });
        }
        Self::read(&index_path)
    }

    /// Read an index file
    pub fn read<P: AsRef<Path>>(index_path: P) -> Result<Self> {
        let index_path = index_path.as_ref();
        let file = File::open(index_path)?;
        Self::parse(BufReader::new(file), index_path)
    }

    /// Parse index lines from any reader; `path` is used in error messages
    pub fn parse<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let mut index = Self::default();

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |reason: String| BloomError::MalformedIndex {
                path: path.to_path_buf(),
                line: line_idx + 1,
                reason,
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                return Err(malformed(format!(
                    "expected 5 fields, found {}",
                    fields.len()
                )));
            }
            let mut numbers = [0u64; 4];
            for (slot, field) in numbers.iter_mut().zip(&fields[1..5]) {
                *slot = field
                    .parse()
                    .map_err(|_| malformed(format!("'{field}' is not a number")))?;
            }
            let [total_length, byte_offset, line_length, chars_per_line] = numbers;
            if line_length == 0 && total_length > 0 {
                return Err(malformed("line length is zero".to_string()));
            }

            index.push(SequenceIndexEntry {
                identifier: fields[0].to_string(),
                total_length,
                byte_offset,
                line_length,
                chars_per_line,
                ordinal: index.entries.len(),
            })?;
        }

        Ok(index)
    }

    fn push(&mut self, entry: SequenceIndexEntry) -> Result<()> {
        if self.by_identifier.contains_key(&entry.identifier) {
            return Err(BloomError::DuplicateSequence(entry.identifier));
        }
        self.by_identifier
            .insert(entry.identifier.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Look up a record by identifier
    pub fn get(&self, identifier: &str) -> Option<&SequenceIndexEntry> {
        self.by_identifier
            .get(identifier)
            .map(|&i| &self.entries[i])
    }

    /// Look up a record, failing with [`BloomError::UnknownSequence`]
    pub fn entry(&self, identifier: &str) -> Result<&SequenceIndexEntry> {
        self.get(identifier)
            .ok_or_else(|| BloomError::UnknownSequence(identifier.to_string()))
    }

    /// Identifiers in index order
    pub fn headers(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.identifier.clone()).collect()
    }

    /// All records in index order
    pub fn entries(&self) -> &[SequenceIndexEntry] {
        &self.entries
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_str(text: &str) -> Result<SequenceIndex> {
        SequenceIndex::parse(text.as_bytes(), Path::new("test.fai"))
    }

    #[test]
    fn test_parse_basic() -> Result<()> {
        let index = parse_str("chr1\t130\t6\t60\t61\nchr2\t10\t150\t60\t61\n")?;
        assert_eq!(index.len(), 2);
        assert_eq!(index.headers(), vec!["chr1", "chr2"]);

        let chr1 = index.entry("chr1")?;
        assert_eq!(chr1.total_length, 130);
        assert_eq!(chr1.byte_offset, 6);
        assert_eq!(chr1.num_lines(), 3);
        assert_eq!(chr1.ordinal, 0);
        assert_eq!(index.entry("chr2")?.ordinal, 1);
        Ok(())
    }

    #[test]
    fn test_extra_columns_and_blank_lines() -> Result<()> {
        let index = parse_str("r1 4 4 4 5 10\n\nr2 8 20 4 5 30\n")?;
        assert_eq!(index.len(), 2);
        assert_eq!(index.entry("r2")?.num_lines(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_identifier() {
        let index = parse_str("chr1\t10\t6\t60\t61\n").unwrap();
        assert!(index.get("chrX").is_none());
        assert!(matches!(
            index.entry("chrX"),
            Err(BloomError::UnknownSequence(id)) if id == "chrX"
        ));
    }

    #[test]
    fn test_duplicate_identifier() {
        let err = parse_str("a\t4\t3\t4\t5\na\t4\t11\t4\t5\n").unwrap_err();
        assert!(matches!(err, BloomError::DuplicateSequence(id) if id == "a"));
    }

    #[test]
    fn test_malformed_lines() {
        let err = parse_str("a\t4\t3\t4\n").unwrap_err();
        assert!(matches!(err, BloomError::MalformedIndex { line: 1, .. }));

        let err = parse_str("a\t4\t3\t4\t5\nb\tten\t3\t4\t5\n").unwrap_err();
        assert!(matches!(err, BloomError::MalformedIndex { line: 2, .. }));

        let err = parse_str("a\t4\t3\t0\t1\n").unwrap_err();
        assert!(matches!(err, BloomError::MalformedIndex { .. }));
    }

    #[test]
    fn test_load_for_missing_index() {
        let fasta = NamedTempFile::new().unwrap();
        let err = SequenceIndex::load_for(fasta.path()).unwrap_err();
        assert!(matches!(err, BloomError::IndexMissing { .. }));
    }

    #[test]
    fn test_load_for_existing_index() -> Result<()> {
        let fasta = NamedTempFile::new()?;
        let fai = SequenceIndex::index_path_for(fasta.path());
        let mut f = File::create(&fai)?;
        writeln!(f, "seq\t8\t5\t8\t9")?;
        drop(f);

        let index = SequenceIndex::load_for(fasta.path())?;
        assert_eq!(index.headers(), vec!["seq"]);
        std::fs::remove_file(fai)?;
        Ok(())
    }

    #[test]
    fn test_index_path_for() {
        assert_eq!(
            SequenceIndex::index_path_for("/data/ref.fa"),
            PathBuf::from("/data/ref.fa.fai")
        );
    }
}
