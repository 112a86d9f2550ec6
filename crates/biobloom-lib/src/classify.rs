//! Read classification against a set of filters
//!
//! Reads are pulled in chunks from one shared FASTA/FASTQ stream (plain or
//! gzipped, parsed by `needletail`) by a fixed pool of workers. Each read is
//! scored against every filter with one hash computation per k-mer, the
//! per-filter verdicts go to a shared [`ResultAggregator`] and, optionally,
//! one assignment line per read is written out.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use needletail::errors::ParseErrorKind;
use needletail::{parse_fastx_file, FastxReader};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bloom::BloomFilter;
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_SCORE_THRESHOLD};
use crate::error::{BloomError, Result};
use crate::multi_filter::FilterSet;
use crate::results::ResultAggregator;

/// Configuration parameters for classifying reads
#[derive(Debug, Clone)]
pub struct ClassifyConfiguration {
    /// Fraction of a read's valid k-mers that must hit a filter
    pub score_threshold: f64,

    /// Count a pair as hitting a filter when either mate does
    pub inclusive: bool,

    /// Number of threads for parallel operations (0 = all available cores)
    pub num_threads: usize,

    /// Records pulled from the input per lock
    pub chunk_size: usize,

    /// Write one `read_id<TAB>label` line per read
    pub write_assignments: bool,
}

impl Default for ClassifyConfiguration {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            inclusive: false,
            num_threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_assignments: false,
        }
    }
}

impl ClassifyConfiguration {
    /// Validate the configuration parameters
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(format!(
                "score threshold must be in range [0, 1], got {}",
                self.score_threshold
            ));
        }
        if self.chunk_size == 0 {
            return Err("chunk size must be positive".to_string());
        }
        Ok(())
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Classify Configuration:");
        tracing::info!("  score_threshold = {}", self.score_threshold);
        tracing::info!("  inclusive = {}", self.inclusive);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        tracing::debug!("  chunk_size = {}", self.chunk_size);
        tracing::debug!("  write_assignments = {}", self.write_assignments);
    }
}

/// Load filters from disk into one [`FilterSet`]
///
/// Each filter is named by the `filter_id` of its metadata file, or by its
/// file stem when that is empty.
///
/// # Errors
/// [`BloomError::ParameterMismatch`] if a filter's hash count, k-mer size
/// or strand handling differs from the first filter's.
pub fn load_filter_set<P: AsRef<Path>>(paths: &[P]) -> Result<FilterSet> {
    let mut set: Option<(FilterSet, bool)> = None;

    for path in paths {
        let path = path.as_ref();
        let (filter, info) = BloomFilter::load_with_info(path)?;
        let name = if info.filter_id.is_empty() {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        } else {
            info.filter_id.clone()
        };

        let (filters, canonical) = set.get_or_insert_with(|| {
            (FilterSet::new(info.hash_num, info.kmer_size), info.canonical)
        });
        let mismatch = |reason: String| BloomError::ParameterMismatch {
            name: name.clone(),
            reason,
        };
        if info.hash_num != filters.hash_num() {
            return Err(mismatch(format!(
                "hash_num {} != {}",
                info.hash_num,
                filters.hash_num()
            )));
        }
        if info.kmer_size != filters.kmer_size() {
            return Err(mismatch(format!(
                "kmer_size {} != {}",
                info.kmer_size,
                filters.kmer_size()
            )));
        }
        if info.canonical != *canonical {
            return Err(mismatch(format!(
                "canonical {} != {}",
                info.canonical, canonical
            )));
        }

        info!(
            "Loaded filter '{}' from {} ({} bits, {} entries)",
            name,
            path.display(),
            info.filter_size,
            info.total_entries
        );
        filters.add_filter(&name, Arc::new(filter));
    }

    set.map(|(filters, _)| filters)
        .ok_or_else(|| BloomError::InvalidConfiguration("no filters given".to_string()))
}

/// Scores reads against a filter set
#[derive(Debug, Clone)]
pub struct ReadClassifier {
    filters: FilterSet,
    score_threshold: f64,
}

impl ReadClassifier {
    /// Create a classifier over `filters`
    pub fn new(filters: FilterSet, score_threshold: f64) -> Self {
        Self {
            filters,
            score_threshold,
        }
    }

    /// The filters reads are scored against
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Score threshold
    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    /// Per-filter verdicts for one read, in filter order
    ///
    /// A filter is hit when at least `score_threshold` of the read's valid
    /// k-mers are found in it. Reads without a valid k-mer hit nothing.
    pub fn read_hits(&self, seq: &[u8]) -> Vec<bool> {
        let k = self.filters.kmer_size();
        let mut counts = vec![0u64; self.filters.len()];
        let mut valid = 0u64;

        if k > 0 && seq.len() >= k {
            for kmer in seq.windows(k) {
                if let Some(hits) = self.filters.query_all(kmer) {
                    valid += 1;
                    for (count, hit) in counts.iter_mut().zip(hits) {
                        *count += hit as u64;
                    }
                }
            }
        }

        counts
            .into_iter()
            .map(|c| valid > 0 && c as f64 / valid as f64 >= self.score_threshold)
            .collect()
    }
}

/// A read taken off the input: identifier and bases
type ReadRecord = (String, Vec<u8>);

fn open_reads(path: &Path) -> Result<Option<Box<dyn FastxReader>>> {
    if std::fs::metadata(path)?.len() == 0 {
        return Ok(None);
    }
    match parse_fastx_file(path) {
        Ok(reader) => Ok(Some(reader)),
        // compressed input can decode to nothing
        Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => Ok(None),
        Err(e) => Err(BloomError::ReadParse(format!("{}: {e}", path.display()))),
    }
}

/// Pull up to `n` records into `out`
fn next_chunk<R: FastxReader + ?Sized>(
    reader: &mut R,
    n: usize,
    out: &mut Vec<ReadRecord>,
) -> Result<()> {
    for _ in 0..n {
        match reader.next() {
            None => break,
            Some(Ok(record)) => {
                let id = record
                    .id()
                    .split(|b| b.is_ascii_whitespace())
                    .next()
                    .unwrap_or_default();
                out.push((
                    String::from_utf8_lossy(id).into_owned(),
                    record.seq().into_owned(),
                ));
            }
            Some(Err(e)) => return Err(BloomError::ReadParse(e.to_string())),
        }
    }
    Ok(())
}

fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| BloomError::InvalidConfiguration(format!("Failed to create thread pool: {e}")))
}

/// Shared state of one classification run
struct RunState<'w> {
    processed: AtomicU64,
    failed: AtomicBool,
    first_error: Mutex<Option<BloomError>>,
    assignments: Option<Mutex<&'w mut (dyn Write + Send)>>,
}

impl<'w> RunState<'w> {
    fn new(assignments: Option<&'w mut (dyn Write + Send)>) -> Self {
        Self {
            processed: AtomicU64::new(0),
            failed: AtomicBool::new(false),
            first_error: Mutex::new(None),
            assignments: assignments.map(Mutex::new),
        }
    }

    fn fail(&self, e: BloomError) {
        self.failed.store(true, Ordering::Relaxed);
        self.first_error.lock().get_or_insert(e);
    }

    fn running(&self) -> bool {
        !self.failed.load(Ordering::Relaxed)
    }

    fn write(&self, lines: &str) {
        if let Some(out) = &self.assignments {
            if let Err(e) = out.lock().write_all(lines.as_bytes()) {
                self.fail(e.into());
            }
        }
    }

    fn finish(self) -> Result<u64> {
        if let Some(e) = self.first_error.into_inner() {
            return Err(e);
        }
        if let Some(out) = self.assignments {
            out.into_inner().flush()?;
        }
        Ok(self.processed.into_inner())
    }
}

/// Classify single-end reads from `reads_path`
///
/// Every read is recorded in `results`; when `assignments` is given a
/// `read_id<TAB>label` line is written for each read. Returns the number
/// of reads processed.
pub fn categorize_reads<P: AsRef<Path>>(
    classifier: &ReadClassifier,
    reads_path: P,
    config: &ClassifyConfiguration,
    results: &ResultAggregator,
    assignments: Option<&mut (dyn Write + Send)>,
) -> Result<u64> {
    config.validate().map_err(BloomError::InvalidConfiguration)?;
    let reads_path = reads_path.as_ref();
    let Some(reader) = open_reads(reads_path)? else {
        info!("{} holds no reads", reads_path.display());
        return Ok(0);
    };
    let reader = Mutex::new(reader);
    let state = RunState::new(assignments);
    let pool = build_pool(config.num_threads)?;

    info!("Classifying reads from {}", reads_path.display());
    pool.broadcast(|_| {
        let mut chunk = Vec::with_capacity(config.chunk_size);
        let mut lines = String::new();
        while state.running() {
            chunk.clear();
            if let Err(e) = next_chunk(&mut **reader.lock(), config.chunk_size, &mut chunk) {
                state.fail(e);
                break;
            }
            if chunk.is_empty() {
                break;
            }

            lines.clear();
            for (id, seq) in &chunk {
                let label = match results.classify(&classifier.read_hits(seq)) {
                    Ok(label) => label,
                    Err(e) => {
                        state.fail(e);
                        return;
                    }
                };
                if state.assignments.is_some() {
                    let _ = writeln!(lines, "{id}\t{label}");
                }
            }
            state.write(&lines);
            state.processed.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        }
    });

    let processed = state.finish()?;
    debug!("Classified {} reads from {}", processed, reads_path.display());
    Ok(processed)
}

/// Classify read pairs from two mate files
///
/// Mates are matched by position. Returns the number of pairs processed.
///
/// # Errors
/// [`BloomError::PairedReadMismatch`] if one file runs out of records
/// before the other.
pub fn categorize_pairs<P: AsRef<Path>, Q: AsRef<Path>>(
    classifier: &ReadClassifier,
    reads1_path: P,
    reads2_path: Q,
    config: &ClassifyConfiguration,
    results: &ResultAggregator,
    assignments: Option<&mut (dyn Write + Send)>,
) -> Result<u64> {
    config.validate().map_err(BloomError::InvalidConfiguration)?;
    let (path1, path2) = (reads1_path.as_ref(), reads2_path.as_ref());
    let (reader1, reader2) = match (open_reads(path1)?, open_reads(path2)?) {
        (Some(r1), Some(r2)) => (r1, r2),
        (None, None) => {
            info!("{} and {} hold no reads", path1.display(), path2.display());
            return Ok(0);
        }
        _ => {
            return Err(BloomError::PairedReadMismatch(format!(
                "one of {} and {} is empty",
                path1.display(),
                path2.display()
            )))
        }
    };
    let readers = Mutex::new((reader1, reader2));
    let state = RunState::new(assignments);
    let pool = build_pool(config.num_threads)?;

    info!(
        "Classifying read pairs from {} and {}",
        path1.display(),
        path2.display()
    );
    pool.broadcast(|_| {
        let mut chunk1 = Vec::with_capacity(config.chunk_size);
        let mut chunk2 = Vec::with_capacity(config.chunk_size);
        let mut lines = String::new();
        while state.running() {
            chunk1.clear();
            chunk2.clear();
            {
                let mut guard = readers.lock();
                let (r1, r2) = &mut *guard;
                let pulled = next_chunk(&mut **r1, config.chunk_size, &mut chunk1)
                    .and_then(|_| next_chunk(&mut **r2, config.chunk_size, &mut chunk2));
                if let Err(e) = pulled {
                    state.fail(e);
                    break;
                }
            }
            if chunk1.len() != chunk2.len() {
                let done = state.processed.load(Ordering::Relaxed);
                state.fail(BloomError::PairedReadMismatch(format!(
                    "{} and {} have different numbers of records (around pair {})",
                    path1.display(),
                    path2.display(),
                    done + chunk1.len().min(chunk2.len()) as u64 + 1
                )));
                break;
            }
            if chunk1.is_empty() {
                break;
            }

            lines.clear();
            for ((id, seq1), (_, seq2)) in chunk1.iter().zip(&chunk2) {
                let hits = (classifier.read_hits(seq1), classifier.read_hits(seq2));
                let label = match results.classify_pair(&hits.0, &hits.1) {
                    Ok(label) => label,
                    Err(e) => {
                        state.fail(e);
                        return;
                    }
                };
                if state.assignments.is_some() {
                    let id = id.strip_suffix("/1").unwrap_or(id);
                    let _ = writeln!(lines, "{id}\t{label}");
                }
            }
            state.write(&lines);
            state.processed.fetch_add(chunk1.len() as u64, Ordering::Relaxed);
        }
    });

    let processed = state.finish()?;
    debug!("Classified {} read pairs", processed);
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildConfiguration, FilterBuilder};
    use crate::testing::{random_dna, write_indexed_fasta};
    use std::fs;
    use tempfile::TempDir;

    fn filter_from(seqs: &[&str], k: usize) -> Arc<BloomFilter> {
        let filter = BloomFilter::new(1 << 20, 3, k);
        for seq in seqs {
            for kmer in seq.as_bytes().windows(k) {
                filter.insert_kmer(kmer);
            }
        }
        Arc::new(filter)
    }

    fn write_fasta(path: &Path, reads: &[(&str, &str)]) {
        let mut text = String::new();
        for (id, seq) in reads {
            text.push_str(&format!(">{id}\n{seq}\n"));
        }
        fs::write(path, text).unwrap();
    }

    struct Fixture {
        classifier: ReadClassifier,
        a: String,
        b: String,
    }

    fn fixture() -> Fixture {
        let a = random_dna(400, 101);
        let b = random_dna(400, 202);
        let mut set = FilterSet::new(3, 15);
        set.add_filter("A", filter_from(&[&a], 15));
        set.add_filter("B", filter_from(&[&b], 15));
        Fixture {
            classifier: ReadClassifier::new(set, 0.15),
            a,
            b,
        }
    }

    #[test]
    fn test_config_validate() {
        assert!(ClassifyConfiguration::default().validate().is_ok());
        let config = ClassifyConfiguration { score_threshold: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
        let config = ClassifyConfiguration { chunk_size: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_hits_threshold() {
        let f = fixture();
        let read_a = &f.a[10..110];
        assert_eq!(f.classifier.read_hits(read_a.as_bytes()), vec![true, false]);

        let chimera = format!("{}{}", &f.a[0..60], &f.b[0..60]);
        assert_eq!(f.classifier.read_hits(chimera.as_bytes()), vec![true, true]);

        assert_eq!(f.classifier.read_hits(b"ACGT"), vec![false, false]);
        assert_eq!(f.classifier.read_hits(&[b'N'; 50]), vec![false, false]);
    }

    #[test]
    fn test_read_hits_strict_threshold() {
        let f = fixture();
        let strict = ReadClassifier::new(f.classifier.filters().clone(), 0.9);
        // a third of the k-mers come from A
        let read = format!("{}{}", &f.a[0..40], random_dna(80, 999));
        assert_eq!(strict.read_hits(read.as_bytes()), vec![false, false]);
    }

    #[test]
    fn test_categorize_reads() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let mut reads = Vec::new();
        let mut ids = Vec::new();
        for i in 0..50 {
            ids.push(format!("a{i}"));
            ids.push(format!("b{i}"));
            ids.push(format!("x{i}"));
        }
        let mut seqs = Vec::new();
        for i in 0..50usize {
            seqs.push(f.a[i..i + 100].to_string());
            seqs.push(f.b[i..i + 100].to_string());
            seqs.push(random_dna(100, 5000 + i as u64));
        }
        for (id, seq) in ids.iter().zip(&seqs) {
            reads.push((id.as_str(), seq.as_str()));
        }
        let path = dir.path().join("reads.fa");
        write_fasta(&path, &reads);

        let config = ClassifyConfiguration {
            num_threads: 4,
            chunk_size: 7,
            ..Default::default()
        };
        let results = ResultAggregator::new(f.classifier.filters().names(), false);
        let mut out = Vec::new();
        let n = categorize_reads(&f.classifier, &path, &config, &results, Some(&mut out)).unwrap();

        assert_eq!(n, 150);
        assert_eq!(results.total_classified(), 150);
        assert_eq!(results.unique_hits("A").unwrap(), 50);
        assert_eq!(results.unique_hits("B").unwrap(), 50);
        assert_eq!(results.no_match_count(), 50);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 150);
        assert!(text.lines().any(|l| l == "a3\tA"));
        assert!(text.lines().any(|l| l == "x7\tnoMatch"));
    }

    #[test]
    fn test_categorize_pairs() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let p1 = dir.path().join("r1.fa");
        let p2 = dir.path().join("r2.fa");
        write_fasta(&p1, &[("p1/1", &f.a[0..100]), ("p2/1", &f.a[0..100])]);
        write_fasta(&p2, &[("p1/2", &f.b[0..100]), ("p2/2", &f.a[200..300])]);

        let config = ClassifyConfiguration { num_threads: 2, ..Default::default() };
        let names = f.classifier.filters().names();

        let strict = ResultAggregator::new(names, false);
        let mut out = Vec::new();
        let n = categorize_pairs(&f.classifier, &p1, &p2, &config, &strict, Some(&mut out)).unwrap();
        assert_eq!(n, 2);
        assert_eq!(strict.no_match_count(), 1);
        assert_eq!(strict.unique_hits("A").unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().any(|l| l == "p1\tnoMatch"));
        assert!(text.lines().any(|l| l == "p2\tA"));

        let inclusive = ResultAggregator::new(names, true);
        categorize_pairs(&f.classifier, &p1, &p2, &config, &inclusive, None).unwrap();
        assert_eq!(inclusive.multi_match_count(), 1);
        assert_eq!(inclusive.unique_hits("A").unwrap(), 1);
    }

    #[test]
    fn test_categorize_pairs_mismatch() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let p1 = dir.path().join("r1.fa");
        let p2 = dir.path().join("r2.fa");
        write_fasta(&p1, &[("p1", &f.a[0..100]), ("p2", &f.a[0..100])]);
        write_fasta(&p2, &[("p1", &f.b[0..100])]);

        let results = ResultAggregator::new(f.classifier.filters().names(), false);
        let err = categorize_pairs(
            &f.classifier,
            &p1,
            &p2,
            &ClassifyConfiguration::default(),
            &results,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BloomError::PairedReadMismatch(_)));
    }

    #[test]
    fn test_empty_read_file() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let path = dir.path().join("empty.fq");
        fs::write(&path, "").unwrap();

        let results = ResultAggregator::new(f.classifier.filters().names(), false);
        let n = categorize_reads(&f.classifier, &path, &ClassifyConfiguration::default(), &results, None)
            .unwrap();
        assert_eq!(n, 0);
        assert!(matches!(results.summarize(n), Err(BloomError::NoReadsProcessed)));
    }

    #[test]
    fn test_aggregator_for_other_filters_is_rejected() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let path = dir.path().join("reads.fa");
        fs::write(&path, format!(">r1\n{}\n", &f.a[5..85])).unwrap();

        let results = ResultAggregator::new(&["only".to_string()], false);
        let err = categorize_reads(&f.classifier, &path, &ClassifyConfiguration::default(), &results, None)
            .unwrap_err();
        assert!(matches!(err, BloomError::InvalidConfiguration(_)));
        assert_eq!(results.total_classified(), 0);
    }

    #[test]
    fn test_empty_gzipped_read_file() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let path = dir.path().join("empty.fq.gz");
        // gzip member wrapping zero bytes
        let empty_gz = [
            0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x03, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        fs::write(&path, empty_gz).unwrap();

        let results = ResultAggregator::new(f.classifier.filters().names(), false);
        let n = categorize_reads(&f.classifier, &path, &ClassifyConfiguration::default(), &results, None)
            .unwrap();
        assert_eq!(n, 0);

        let pairs = categorize_pairs(
            &f.classifier,
            &path,
            &path,
            &ClassifyConfiguration::default(),
            &results,
            None,
        )
        .unwrap();
        assert_eq!(pairs, 0);
    }

    #[test]
    fn test_fastq_input() {
        let dir = TempDir::new().unwrap();
        let f = fixture();
        let path = dir.path().join("reads.fq");
        let qual = "I".repeat(80);
        fs::write(
            &path,
            format!("@r1 extra\n{}\n+\n{qual}\n@r2\n{}\n+\n{qual}\n", &f.b[5..85], &f.a[5..85]),
        )
        .unwrap();

        let results = ResultAggregator::new(f.classifier.filters().names(), false);
        let mut out = Vec::new();
        categorize_reads(
            &f.classifier,
            &path,
            &ClassifyConfiguration { num_threads: 1, ..Default::default() },
            &results,
            Some(&mut out),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "r1\tB\nr2\tA\n");
    }

    #[test]
    fn test_load_filter_set() {
        let dir = TempDir::new().unwrap();
        let fa1 = write_indexed_fasta(dir.path(), "one.fa", &[("s", &random_dna(200, 1))], 60);
        let fa2 = write_indexed_fasta(dir.path(), "two.fa", &[("s", &random_dna(200, 2))], 60);
        let config = BuildConfiguration { kmer_size: 15, hash_num: 3, ..Default::default() };

        let out1 = dir.path().join("one.bf");
        let out2 = dir.path().join("two.bf");
        FilterBuilder::new(&[&fa1], config.clone()).unwrap().generate(&out1).unwrap();
        FilterBuilder::new(&[&fa2], config).unwrap().generate(&out2).unwrap();

        let set = load_filter_set(&[&out2, &out1]).unwrap();
        assert_eq!(set.names(), &["two", "one"]);
        assert_eq!(set.kmer_size(), 15);
        assert_eq!(set.hash_num(), 3);
    }

    #[test]
    fn test_load_filter_set_parameter_mismatch() {
        let dir = TempDir::new().unwrap();
        let fa = write_indexed_fasta(dir.path(), "one.fa", &[("s", &random_dna(200, 1))], 60);

        let out1 = dir.path().join("k15.bf");
        let out2 = dir.path().join("k17.bf");
        let config = BuildConfiguration { kmer_size: 15, hash_num: 3, ..Default::default() };
        FilterBuilder::new(&[&fa], config).unwrap().generate(&out1).unwrap();
        let config = BuildConfiguration { kmer_size: 17, hash_num: 3, ..Default::default() };
        FilterBuilder::new(&[&fa], config).unwrap().generate(&out2).unwrap();

        let err = load_filter_set(&[&out1, &out2]).unwrap_err();
        assert!(matches!(err, BloomError::ParameterMismatch { name, .. } if name == "k17"));
    }

    #[test]
    fn test_load_filter_set_empty() {
        let paths: [&Path; 0] = [];
        assert!(load_filter_set(&paths).is_err());
    }
}
