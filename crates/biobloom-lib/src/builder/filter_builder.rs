//! Filter construction from indexed FASTA files
//!
//! Every record of every input file is streamed through a
//! [`WindowedSequenceReader`] shared by a fixed pool of workers. Each worker
//! pulls the next block under the reader's lock and slides a k-mer cursor
//! over it outside the lock, inserting into the target filter.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bloom::{info_path_for, BloomFilter, FilterInfo};
use crate::builder::config::BuildConfiguration;
use crate::error::{BloomError, Result};
use crate::sequence_index::SequenceIndex;
use crate::windowed_reader::WindowedSequenceReader;

/// Number of lock stripes guarding check-then-insert on the target filter
const INSERT_LOCKS: usize = 64;

/// Counters shared by the workers of one build
#[derive(Default)]
struct BuildCounters {
    inserted: AtomicU64,
    redundant: AtomicU64,
    removed: AtomicU64,
}

/// Builds one Bloom filter from a set of sequence files
#[derive(Debug)]
pub struct FilterBuilder {
    config: BuildConfiguration,
    files: Vec<PathBuf>,
    /// Identifiers of each file, in file order
    headers: Vec<Vec<String>>,
    expected_entries: u64,
    filter_size: u64,
    total_entries: u64,
    redundancy: u64,
    kmers_removed: u64,
}

impl FilterBuilder {
    /// Prepare a build over `files`
    ///
    /// Loads the index of every file up front, so a missing index fails
    /// here rather than halfway through a build. The expected number of
    /// entries is the number of k-mer positions over all records and the
    /// filter is sized for `config.desired_fpr` until
    /// [`set_filter_size`](Self::set_filter_size) says otherwise.
    pub fn new<P: AsRef<Path>>(files: &[P], config: BuildConfiguration) -> Result<Self> {
        config.validate().map_err(BloomError::InvalidConfiguration)?;
        let k = config.kmer_size as u64;

        let mut paths = Vec::with_capacity(files.len());
        let mut headers = Vec::with_capacity(files.len());
        let mut expected_entries = 0u64;
        for file in files {
            let file = file.as_ref();
            let index = SequenceIndex::load_for(file)?;
            File::open(file)?;
            for entry in index.entries() {
                expected_entries += (entry.total_length + 1).saturating_sub(k);
            }
            headers.push(index.headers());
            paths.push(file.to_path_buf());
        }

        let filter_size =
            BuildConfiguration::optimal_filter_size(expected_entries, config.desired_fpr);
        debug!(
            "{} files, {} expected entries, {} bits",
            paths.len(),
            expected_entries,
            filter_size
        );

        Ok(Self {
            config,
            files: paths,
            headers,
            expected_entries,
            filter_size,
            total_entries: 0,
            redundancy: 0,
            kmers_removed: 0,
        })
    }

    /// Same as [`new`](Self::new) with a caller-supplied number of entries
    pub fn with_expected_entries<P: AsRef<Path>>(
        files: &[P],
        config: BuildConfiguration,
        expected_entries: u64,
    ) -> Result<Self> {
        let mut builder = Self::new(files, config)?;
        builder.expected_entries = expected_entries;
        builder.filter_size =
            BuildConfiguration::optimal_filter_size(expected_entries, builder.config.desired_fpr);
        Ok(builder)
    }

    /// Override the filter size in bits
    pub fn set_filter_size(&mut self, bits: u64) {
        self.filter_size = bits;
    }

    /// Filter size in bits
    pub fn filter_size(&self) -> u64 {
        self.filter_size
    }

    /// Number of entries the filter is sized for
    pub fn expected_entries(&self) -> u64 {
        self.expected_entries
    }

    /// Entries inserted by the last build
    pub fn total_entries(&self) -> u64 {
        self.total_entries
    }

    /// Redundant k-mers seen by the last build
    pub fn redundancy(&self) -> u64 {
        self.redundancy
    }

    /// K-mers skipped by the last subtractive build
    pub fn kmers_removed(&self) -> u64 {
        self.kmers_removed
    }

    /// Input files in build order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Build configuration
    pub fn config(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Build the filter in memory; returns it with the redundancy count
    pub fn build_filter(&mut self) -> Result<(BloomFilter, u64)> {
        self.build(None)
    }

    /// Build the filter in memory, skipping every k-mer `subtract` contains
    ///
    /// # Errors
    /// The subtraction filter must use the same k-mer size as the build.
    pub fn build_filter_subtractive(&mut self, subtract: &BloomFilter) -> Result<(BloomFilter, u64)> {
        let target = self.config.kmer_size;
        let sub_k = subtract.kmer_size();
        if sub_k > target {
            return Err(BloomError::SubtractiveKmerTooLarge { subtract: sub_k, target });
        }
        if sub_k != target {
            return Err(BloomError::KmerSizeMismatch { subtract: sub_k, target });
        }
        self.build(Some(subtract))
    }

    /// Build the filter and write it to `output` with its metadata file
    ///
    /// Returns the redundancy count.
    pub fn generate<P: AsRef<Path>>(&mut self, output: P) -> Result<u64> {
        let (filter, redundancy) = self.build_filter()?;
        self.write(output.as_ref(), &filter)?;
        Ok(redundancy)
    }

    /// Subtractive [`generate`](Self::generate): k-mers found in the filter
    /// stored at `subtract_path` are left out
    pub fn generate_subtractive<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        output: P,
        subtract_path: Q,
    ) -> Result<u64> {
        let subtract_path = subtract_path.as_ref();
        let (subtract, sub_info) = BloomFilter::load_with_info(subtract_path)?;
        info!(
            "Subtracting k-mers of '{}' ({})",
            sub_info.filter_id,
            subtract_path.display()
        );
        let (filter, redundancy) = self.build_filter_subtractive(&subtract)?;
        self.write(output.as_ref(), &filter)?;
        Ok(redundancy)
    }

    /// Metadata describing the last build
    pub fn filter_info(&self, filter_id: &str) -> FilterInfo {
        let mut info = FilterInfo::new(
            filter_id,
            self.config.kmer_size,
            self.config.hash_num,
            self.filter_size,
        );
        info.canonical = self.config.canonical;
        info.expected_entries = self.expected_entries;
        info.total_entries = self.total_entries;
        info.redundancy = self.redundancy;
        info.kmers_removed = self.kmers_removed;
        info.desired_fpr = self.config.desired_fpr;
        info.sequence_sources = self
            .files
            .iter()
            .map(|f| f.display().to_string())
            .collect();
        info
    }

    fn write(&self, output: &Path, filter: &BloomFilter) -> Result<()> {
        filter.store(output)?;
        let filter_id = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info_path = info_path_for(output);
        self.filter_info(&filter_id).write(&info_path)?;
        info!(
            "Wrote filter to {} (metadata {})",
            output.display(),
            info_path.display()
        );
        Ok(())
    }

    fn build(&mut self, subtract: Option<&BloomFilter>) -> Result<(BloomFilter, u64)> {
        if self.config.hash_num == 0 {
            return Err(BloomError::InvalidConfiguration(
                "number of hash functions must be positive".to_string(),
            ));
        }
        if self.filter_size <= self.expected_entries {
            return Err(BloomError::FilterTooSmall {
                filter_size: self.filter_size,
                expected_entries: self.expected_entries,
            });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| {
                BloomError::InvalidConfiguration(format!("Failed to create thread pool: {e}"))
            })?;

        let filter = BloomFilter::new(self.filter_size, self.config.hash_num, self.config.kmer_size)
            .with_canonical(self.config.canonical);
        let counters = BuildCounters::default();
        let locks: Vec<Mutex<()>> = (0..INSERT_LOCKS).map(|_| Mutex::new(())).collect();

        for (file, headers) in self.files.iter().zip(&self.headers) {
            let reader = WindowedSequenceReader::open_with_block_size(
                file,
                self.config.kmer_size,
                self.config.block_size,
            )?;
            let reader = Mutex::new(reader);

            for header in headers {
                reader.lock().set_location_by_header(header)?;
                let failed = AtomicBool::new(false);
                let first_error: Mutex<Option<BloomError>> = Mutex::new(None);

                pool.broadcast(|_| {
                    while !failed.load(Ordering::Relaxed) {
                        let window = match reader.lock().next_window() {
                            Ok(Some(window)) => window,
                            Ok(None) => break,
                            Err(e) => {
                                failed.store(true, Ordering::Relaxed);
                                first_error.lock().get_or_insert(e);
                                break;
                            }
                        };
                        self.process_window(&window, &filter, subtract, &locks, &counters);
                    }
                });

                if let Some(e) = first_error.into_inner() {
                    return Err(e);
                }
            }
            info!("Finished processing {}", file.display());
        }

        self.total_entries = counters.inserted.into_inner();
        self.redundancy = counters.redundant.into_inner();
        self.kmers_removed = counters.removed.into_inner();

        info!("Total inserted entries: {}", self.total_entries);
        info!("Redundant k-mers: {}", self.redundancy);
        if subtract.is_some() {
            info!("K-mers removed by subtraction: {}", self.kmers_removed);
        }
        Ok((filter, self.redundancy))
    }

    /// Slide a k-mer cursor over one block
    ///
    /// Equal k-mers hash to the same stripe of `locks`, so a k-mer shared by
    /// two overlapping blocks is inserted once and counted redundant once.
    fn process_window(
        &self,
        window: &[u8],
        filter: &BloomFilter,
        subtract: Option<&BloomFilter>,
        locks: &[Mutex<()>],
        counters: &BuildCounters,
    ) {
        let (mut inserted, mut redundant, mut removed) = (0u64, 0u64, 0u64);

        for kmer in window.windows(self.config.kmer_size) {
            if subtract.is_some_and(|sub| sub.contains_kmer(kmer)) {
                removed += 1;
                continue;
            }
            let Some(hashes) = filter.multi_hash(kmer) else {
                continue;
            };
            let _guard = locks[(hashes[0] % locks.len() as u64) as usize].lock();
            if filter.contains(&hashes) {
                redundant += 1;
            } else {
                filter.insert(&hashes);
                inserted += 1;
            }
        }

        counters.inserted.fetch_add(inserted, Ordering::Relaxed);
        counters.redundant.fetch_add(redundant, Ordering::Relaxed);
        counters.removed.fetch_add(removed, Ordering::Relaxed);
    }
}
