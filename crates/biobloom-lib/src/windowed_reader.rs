//! Block-wise extraction of overlapping sequence windows from indexed FASTA
//!
//! The reader seeks straight to a record using its `.fai` entry and hands out
//! large blocks of bases. Consecutive blocks overlap by `window_size - 1`
//! bases so that every window of `window_size` bases of the record lies
//! inside exactly one block.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::constants::DEFAULT_BLOCK_SIZE;
use crate::error::{BloomError, Result};
use crate::sequence_index::{SequenceIndex, SequenceIndexEntry};

/// Sequential reader of overlapping blocks, one record at a time
///
/// Not thread-safe on its own; share it behind a mutex.
pub struct WindowedSequenceReader {
    path: PathBuf,
    reader: BufReader<File>,
    index: SequenceIndex,
    window_size: usize,
    block_size: usize,
    /// Record the cursor is positioned on
    current: Option<usize>,
    lines_read: u64,
    bases_remaining: u64,
    buffer: Vec<u8>,
    has_more: bool,
    line: Vec<u8>,
}

impl WindowedSequenceReader {
    /// Open `path` with the default block size
    pub fn open<P: AsRef<Path>>(path: P, window_size: usize) -> Result<Self> {
        Self::open_with_block_size(path, window_size, DEFAULT_BLOCK_SIZE)
    }

    /// Open `path` and position the cursor on its first record
    ///
    /// # Errors
    /// [`BloomError::IndexMissing`] if `<path>.fai` does not exist.
    pub fn open_with_block_size<P: AsRef<Path>>(
        path: P,
        window_size: usize,
        block_size: usize,
    ) -> Result<Self> {
        if window_size == 0 {
            return Err(BloomError::InvalidConfiguration(
                "window size must be positive".to_string(),
            ));
        }
        let path = path.as_ref();
        let index = SequenceIndex::load_for(path)?;
        let reader = BufReader::new(File::open(path)?);

        let mut windowed = Self {
            path: path.to_path_buf(),
            reader,
            index,
            window_size,
            block_size,
            current: None,
            lines_read: 0,
            bases_remaining: 0,
            buffer: Vec::new(),
            has_more: false,
            line: Vec::new(),
        };
        if let Some(first) = windowed.index.entries().first() {
            let first = first.identifier.clone();
            windowed.set_location_by_header(&first)?;
        }
        Ok(windowed)
    }

    /// Path of the underlying sequence file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifiers in index order
    pub fn headers(&self) -> Vec<String> {
        self.index.headers()
    }

    /// The loaded index
    pub fn index(&self) -> &SequenceIndex {
        &self.index
    }

    /// Window size the reader was opened with
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Identifier of the record the cursor is on
    pub fn current_header(&self) -> Option<&str> {
        self.current
            .map(|i| self.index.entries()[i].identifier.as_str())
    }

    /// Total bases of `identifier`
    pub fn sequence_length(&self, identifier: &str) -> Result<u64> {
        Ok(self.index.entry(identifier)?.total_length)
    }

    /// Move the cursor to the start of `identifier` and buffer its first block
    pub fn set_location_by_header(&mut self, identifier: &str) -> Result<()> {
        let entry = self.index.entry(identifier)?;
        let ordinal = entry.ordinal;
        let offset = entry.byte_offset;
        let bases = entry.total_length;

        self.reader.seek(SeekFrom::Start(offset))?;
        self.current = Some(ordinal);
        self.lines_read = 0;
        self.bases_remaining = bases;
        self.buffer.clear();
        self.has_more = true;
        self.fill()?;
        trace!(
            "Positioned {} at {} ({} bases buffered)",
            self.path.display(),
            identifier,
            self.buffer.len()
        );
        Ok(())
    }

    fn current_entry(&self) -> Option<&SequenceIndexEntry> {
        self.current.map(|i| &self.index.entries()[i])
    }

    /// Append whole lines until the buffer holds a block or the record ends
    fn fill(&mut self) -> Result<()> {
        let Some(num_lines) = self.current_entry().map(SequenceIndexEntry::num_lines) else {
            return Ok(());
        };
        let target = self.block_size.max(self.window_size);

        while self.buffer.len() < target
            && self.lines_read < num_lines
            && self.bases_remaining > 0
        {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                break;
            }
            self.lines_read += 1;
            while matches!(self.line.last(), Some(b'\n' | b'\r')) {
                self.line.pop();
            }
            let take = self.line.len().min(self.bases_remaining as usize);
            self.buffer.extend_from_slice(&self.line[..take]);
            self.bases_remaining -= take as u64;
        }
        Ok(())
    }

    /// Hand out the buffered block, or `None` once no full window remains
    ///
    /// After a block is returned only its last `window_size - 1` bases are
    /// kept and the buffer is refilled from the file.
    pub fn next_window(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.has_more || self.current.is_none() {
            return Ok(None);
        }
        if self.buffer.len() < self.window_size {
            self.has_more = false;
            self.buffer.clear();
            return Ok(None);
        }

        let window = std::mem::take(&mut self.buffer);
        let overlap = self.window_size - 1;
        self.buffer
            .extend_from_slice(&window[window.len() - overlap..]);
        self.fill()?;
        Ok(Some(window))
    }
}

impl std::fmt::Debug for WindowedSequenceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowedSequenceReader")
            .field("path", &self.path)
            .field("window_size", &self.window_size)
            .field("block_size", &self.block_size)
            .field("current", &self.current_header())
            .finish_non_exhaustive()
    }
}
