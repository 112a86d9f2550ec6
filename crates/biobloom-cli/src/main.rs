use anyhow::{bail, Context};
use biobloom_lib::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_FPR, DEFAULT_KMER_SIZE, DEFAULT_SCORE_THRESHOLD, FILTER_EXTENSION,
};
use biobloom_lib::{
    categorize_pairs, categorize_reads, load_filter_set, BuildConfiguration, ClassifyConfiguration,
    FilterBuilder, ReadClassifier, ResultAggregator,
};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "biobloom")]
#[command(version = "0.1.0")]
#[command(about = "BioBloom: Bloom filter based read categorization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a Bloom filter from indexed FASTA files
    Make {
        /// Reference FASTA files (each needs a samtools faidx index)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Filter name; output files are <prefix>.bf and <prefix>.txt
        #[arg(short, long)]
        prefix: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// K-mer length
        #[arg(short, long, default_value_t = DEFAULT_KMER_SIZE)]
        kmer_size: usize,

        /// Number of hash functions (default: optimal for the false positive rate)
        #[arg(short = 'g', long)]
        hash_num: Option<usize>,

        /// Target false positive rate
        #[arg(short, long, default_value_t = DEFAULT_FPR)]
        fpr: f64,

        /// Expected number of entries (default: number of k-mer positions in the input)
        #[arg(short = 'n', long)]
        num_entries: Option<u64>,

        /// Leave out k-mers contained in this filter
        #[arg(short, long)]
        subtract: Option<PathBuf>,

        /// Hash k-mers and their reverse complements alike
        #[arg(long, default_value = "false")]
        canonical: bool,

        /// Number of threads (0 = all available cores)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
    },

    /// Categorize reads against one or more filters
    Categorize {
        /// Read files (FASTA/FASTQ, optionally gzipped); two files when paired
        #[arg(required = true)]
        reads: Vec<PathBuf>,

        /// Filter files (.bf, with their .txt metadata next to them)
        #[arg(short = 'f', long = "filter", required = true)]
        filters: Vec<PathBuf>,

        /// Output prefix
        #[arg(short, long, default_value = "biobloom")]
        prefix: String,

        /// Fraction of a read's k-mers that must hit a filter
        #[arg(short, long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
        score: f64,

        /// Treat the two read files as mates of paired-end reads
        #[arg(short = 'e', long)]
        paired: bool,

        /// A pair hits a filter when either mate does (default: both must)
        #[arg(short, long)]
        inclusive: bool,

        /// Number of threads (0 = all available cores)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,

        /// Records pulled from the input at a time
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Write the label of every read to <prefix>_assignments.tsv
        #[arg(long)]
        assignments: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Make {
            files,
            prefix,
            output_dir,
            kmer_size,
            hash_num,
            fpr,
            num_entries,
            subtract,
            canonical,
            threads,
        } => {
            let config = BuildConfiguration {
                kmer_size,
                hash_num: hash_num.unwrap_or_else(|| BuildConfiguration::optimal_hash_num(fpr)),
                canonical,
                num_threads: threads,
                desired_fpr: fpr,
                ..BuildConfiguration::default()
            };
            make_command(files, prefix, output_dir, config, num_entries, subtract)?;
        }
        Commands::Categorize {
            reads,
            filters,
            prefix,
            score,
            paired,
            inclusive,
            threads,
            chunk_size,
            assignments,
        } => {
            let config = ClassifyConfiguration {
                score_threshold: score,
                inclusive,
                num_threads: threads,
                chunk_size,
                write_assignments: assignments,
            };
            categorize_command(reads, filters, prefix, paired, config)?;
        }
    }

    Ok(())
}

/// Build a filter and write it with its metadata file
fn make_command(
    files: Vec<PathBuf>,
    prefix: String,
    output_dir: PathBuf,
    config: BuildConfiguration,
    num_entries: Option<u64>,
    subtract: Option<PathBuf>,
) -> anyhow::Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
    config.print();
    info!("Building filter '{}' from {} file(s)", prefix, files.len());

    let mut builder = match num_entries {
        Some(n) => FilterBuilder::with_expected_entries(&files, config, n)?,
        None => FilterBuilder::new(&files, config)?,
    };
    info!("  Expected entries: {}", builder.expected_entries());
    info!("  Filter size: {} bits", builder.filter_size());

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let output = output_dir.join(format!("{prefix}.{FILTER_EXTENSION}"));

    let redundancy = match &subtract {
        Some(sub) => builder
            .generate_subtractive(&output, sub)
            .with_context(|| format!("Failed to build filter subtracting {}", sub.display()))?,
        None => builder.generate(&output).context("Failed to build filter")?,
    };

    let stats = builder.filter_info(&prefix);
    info!("Filter built successfully!");
    info!("  Inserted entries: {}", builder.total_entries());
    info!("  Redundant k-mers: {} ({:.4})", redundancy, stats.redundancy_rate());
    if subtract.is_some() {
        info!("  K-mers removed: {}", builder.kmers_removed());
    }
    info!("  Estimated false positive rate: {:.6}", stats.false_positive_rate());
    Ok(())
}

/// Categorize reads and write the summary table
fn categorize_command(
    reads: Vec<PathBuf>,
    filters: Vec<PathBuf>,
    prefix: String,
    paired: bool,
    config: ClassifyConfiguration,
) -> anyhow::Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
    config.print();
    if paired && reads.len() != 2 {
        bail!("Paired mode takes exactly two read files, got {}", reads.len());
    }

    let set = load_filter_set(&filters).context("Failed to load filters")?;
    debug!("Filter order: {:?}", set.names());
    let classifier = ReadClassifier::new(set, config.score_threshold);
    let results = ResultAggregator::new(classifier.filters().names(), config.inclusive);

    let mut assignments = if config.write_assignments {
        let path = format!("{prefix}_assignments.tsv");
        let file = File::create(&path).with_context(|| format!("Failed to create {path}"))?;
        Some(BufWriter::new(file))
    } else {
        None
    };

    let total = if paired {
        categorize_pairs(
            &classifier,
            &reads[0],
            &reads[1],
            &config,
            &results,
            assignments.as_mut().map(|w| w as &mut (dyn Write + Send)),
        )?
    } else {
        let mut total = 0;
        for path in &reads {
            total += categorize_reads(
                &classifier,
                path,
                &config,
                &results,
                assignments.as_mut().map(|w| w as &mut (dyn Write + Send)),
            )
            .with_context(|| format!("Failed to categorize {}", path.display()))?;
        }
        total
    };
    info!("Processed {} {}", total, if paired { "read pairs" } else { "reads" });

    let summary = results.summarize(total)?;
    let summary_path = format!("{prefix}_summary.tsv");
    fs::write(&summary_path, summary.to_string())
        .with_context(|| format!("Failed to write {summary_path}"))?;
    info!("Summary written to {}", summary_path);
    for row in &summary.rows {
        info!("  {}: {} hits ({:.4})", row.filter_id, row.hits, row.rate_hit);
    }

    Ok(())
}
