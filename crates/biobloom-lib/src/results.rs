//! Thread-safe aggregation of per-read classification results
//!
//! Each read (or read pair) ends in exactly one of three states: hit on a
//! single filter, hit on several filters ([`MULTI_MATCH`]) or hit on none
//! ([`NO_MATCH`]). Per-filter counters are atomics sized when the
//! aggregator is created, so workers never take a lock to record a read.

use ahash::AHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::{MULTI_MATCH, NO_MATCH};
use crate::error::{BloomError, Result};

/// Outcome for one read or read pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Hit exactly one filter
    Unique(&'a str),
    /// Hit more than one filter
    MultiMatch,
    /// Hit no filter
    NoMatch,
}

impl Classification<'_> {
    /// Filter name, or the `multiMatch` / `noMatch` sentinel
    pub fn label(&self) -> &str {
        match self {
            Classification::Unique(name) => name,
            Classification::MultiMatch => MULTI_MATCH,
            Classification::NoMatch => NO_MATCH,
        }
    }
}

impl fmt::Display for Classification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Running counters over all classified reads
#[derive(Debug)]
pub struct ResultAggregator {
    filter_order: Vec<String>,
    slots: AHashMap<String, usize>,
    above_threshold: Vec<AtomicU64>,
    unique: Vec<AtomicU64>,
    multi_match: AtomicU64,
    no_match: AtomicU64,
    inclusive: bool,
}

impl ResultAggregator {
    /// Create counters for `filter_order`, the order rows are reported in
    ///
    /// `inclusive` decides how read pairs combine: a filter counts as hit
    /// when either mate hits it (`true`) or only when both do (`false`).
    pub fn new(filter_order: &[String], inclusive: bool) -> Self {
        let counters = || {
            let mut v = Vec::with_capacity(filter_order.len());
            v.resize_with(filter_order.len(), || AtomicU64::new(0));
            v
        };
        Self {
            filter_order: filter_order.to_vec(),
            slots: filter_order
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect(),
            above_threshold: counters(),
            unique: counters(),
            multi_match: AtomicU64::new(0),
            no_match: AtomicU64::new(0),
            inclusive,
        }
    }

    /// Record one read given its per-filter hits, aligned with the filter order
    ///
    /// # Errors
    /// [`BloomError::InvalidConfiguration`] if `hits` does not hold one
    /// entry per filter; nothing is recorded in that case.
    pub fn classify(&self, hits: &[bool]) -> Result<Classification<'_>> {
        self.check_len(hits)?;
        Ok(self.record(|i| hits[i]))
    }

    /// Record one read pair
    ///
    /// # Errors
    /// Same as [`classify`](Self::classify), for either mate.
    pub fn classify_pair(&self, hits1: &[bool], hits2: &[bool]) -> Result<Classification<'_>> {
        self.check_len(hits1)?;
        self.check_len(hits2)?;
        if self.inclusive {
            Ok(self.record(|i| hits1[i] || hits2[i]))
        } else {
            Ok(self.record(|i| hits1[i] && hits2[i]))
        }
    }

    fn check_len(&self, hits: &[bool]) -> Result<()> {
        if hits.len() != self.filter_order.len() {
            return Err(BloomError::InvalidConfiguration(format!(
                "got {} filter results, expected one per filter ({})",
                hits.len(),
                self.filter_order.len()
            )));
        }
        Ok(())
    }

    /// Record one read given hits keyed by filter name
    ///
    /// # Errors
    /// [`BloomError::FilterNotFound`] if a filter of the order is missing
    /// from `hits`; nothing is recorded in that case.
    pub fn classify_named(&self, hits: &AHashMap<String, bool>) -> Result<Classification<'_>> {
        let aligned = self
            .filter_order
            .iter()
            .map(|name| {
                hits.get(name)
                    .copied()
                    .ok_or_else(|| BloomError::FilterNotFound(name.clone()))
            })
            .collect::<Result<Vec<bool>>>()?;
        self.classify(&aligned)
    }

    fn record(&self, is_hit: impl Fn(usize) -> bool) -> Classification<'_> {
        let mut chosen = None;
        let mut multi = false;

        for i in 0..self.filter_order.len() {
            if is_hit(i) {
                self.above_threshold[i].fetch_add(1, Ordering::Relaxed);
                if chosen.is_none() {
                    chosen = Some(i);
                } else {
                    multi = true;
                }
            }
        }

        match chosen {
            None => {
                self.no_match.fetch_add(1, Ordering::Relaxed);
                Classification::NoMatch
            }
            Some(_) if multi => {
                self.multi_match.fetch_add(1, Ordering::Relaxed);
                Classification::MultiMatch
            }
            Some(i) => {
                self.unique[i].fetch_add(1, Ordering::Relaxed);
                Classification::Unique(&self.filter_order[i])
            }
        }
    }

    fn slot(&self, name: &str) -> Result<usize> {
        self.slots
            .get(name)
            .copied()
            .ok_or_else(|| BloomError::FilterNotFound(name.to_string()))
    }

    /// Filter names in report order
    pub fn filter_order(&self) -> &[String] {
        &self.filter_order
    }

    /// Whether pairs are combined inclusively
    pub fn inclusive(&self) -> bool {
        self.inclusive
    }

    /// Reads that hit `name`, alone or together with other filters
    pub fn hits(&self, name: &str) -> Result<u64> {
        Ok(self.above_threshold[self.slot(name)?].load(Ordering::Relaxed))
    }

    /// Reads that hit `name` and nothing else
    pub fn unique_hits(&self, name: &str) -> Result<u64> {
        Ok(self.unique[self.slot(name)?].load(Ordering::Relaxed))
    }

    /// Reads that hit more than one filter
    pub fn multi_match_count(&self) -> u64 {
        self.multi_match.load(Ordering::Relaxed)
    }

    /// Reads that hit no filter
    pub fn no_match_count(&self) -> u64 {
        self.no_match.load(Ordering::Relaxed)
    }

    /// Reads recorded so far
    pub fn total_classified(&self) -> u64 {
        self.unique
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum::<u64>()
            + self.multi_match_count()
            + self.no_match_count()
    }

    /// Per-filter and sentinel rows over `total_reads` reads
    ///
    /// # Errors
    /// [`BloomError::NoReadsProcessed`] if `total_reads` is zero.
    pub fn summarize(&self, total_reads: u64) -> Result<Summary> {
        if total_reads == 0 {
            return Err(BloomError::NoReadsProcessed);
        }

        let mut rows = Vec::with_capacity(self.filter_order.len() + 2);
        for (i, name) in self.filter_order.iter().enumerate() {
            let hits = self.above_threshold[i].load(Ordering::Relaxed);
            let unique = self.unique[i].load(Ordering::Relaxed);
            rows.push(SummaryRow::new(name, hits, hits.saturating_sub(unique), total_reads));
        }
        rows.push(SummaryRow::new(MULTI_MATCH, self.multi_match_count(), 0, total_reads));
        rows.push(SummaryRow::new(NO_MATCH, self.no_match_count(), 0, total_reads));

        Ok(Summary { total_reads, rows })
    }
}

/// One line of the summary table
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Filter name or sentinel label
    pub filter_id: String,
    /// Reads hitting the filter
    pub hits: u64,
    /// Reads not hitting the filter
    pub misses: u64,
    /// Reads hitting the filter and at least one other
    pub shared: u64,
    /// `hits / total`
    pub rate_hit: f64,
    /// `misses / total`
    pub rate_miss: f64,
    /// `shared / total`
    pub rate_shared: f64,
}

impl SummaryRow {
    fn new(filter_id: &str, hits: u64, shared: u64, total: u64) -> Self {
        let misses = total.saturating_sub(hits);
        let total_f = total as f64;
        Self {
            filter_id: filter_id.to_string(),
            hits,
            misses,
            shared,
            rate_hit: hits as f64 / total_f,
            rate_miss: misses as f64 / total_f,
            rate_shared: shared as f64 / total_f,
        }
    }
}

/// Classification summary, rendered as TSV by its `Display` impl
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Reads the rates are relative to
    pub total_reads: u64,
    /// Filter rows in order, then `multiMatch` and `noMatch`
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Column names of the TSV header
    pub const HEADER: [&'static str; 7] = [
        "filter_id",
        "hits",
        "misses",
        "shared",
        "rate_hit",
        "rate_miss",
        "rate_shared",
    ];

    /// Row for `filter_id`, if present
    pub fn row(&self, filter_id: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.filter_id == filter_id)
    }
}

/// Six significant digits with trailing zeros dropped, switching to
/// exponent notation below 1e-4 (`0.333333`, `0.000123457`, `1e-07`)
fn format_rate(rate: f64) -> String {
    const PRECISION: i32 = 6;
    if rate == 0.0 || !rate.is_finite() {
        return if rate == 0.0 { "0".to_string() } else { rate.to_string() };
    }

    // rounding to the precision first fixes the exponent
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, rate);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{rate:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::HEADER.join("\t"))?;
        for row in &self.rows {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.filter_id,
                row.hits,
                row.misses,
                row.shared,
                format_rate(row.rate_hit),
                format_rate(row.rate_miss),
                format_rate(row.rate_shared),
            )?;
        }
        Ok(())
    }
}
