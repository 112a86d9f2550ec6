//! Fixtures shared by unit tests

use std::fs;
use std::path::{Path, PathBuf};

use crate::sequence_index::SequenceIndex;

/// Write a FASTA file wrapped at `width` bases per line plus its `.fai`
pub(crate) fn write_indexed_fasta(
    dir: &Path,
    name: &str,
    records: &[(&str, &str)],
    width: usize,
) -> PathBuf {
    let path = dir.join(name);
    let mut fasta = Vec::new();
    let mut fai = String::new();
    for (id, seq) in records {
        fasta.extend_from_slice(format!(">{id} test record\n").as_bytes());
        let offset = fasta.len();
        for line in seq.as_bytes().chunks(width) {
            fasta.extend_from_slice(line);
            fasta.push(b'\n');
        }
        fai.push_str(&format!(
            "{id}\t{}\t{offset}\t{width}\t{}\n",
            seq.len(),
            width + 1
        ));
    }
    fs::write(&path, fasta).unwrap();
    fs::write(SequenceIndex::index_path_for(&path), fai).unwrap();
    path
}

/// Deterministic pseudo-random DNA
pub(crate) fn random_dna(len: usize, seed: u64) -> String {
    let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[(state >> 60) as usize & 3] as char
        })
        .collect()
}
