//! DNA nucleotide encoding and k-mer preparation
//!
//! K-mers are packed two bits per base into a `u128`, first base in the
//! most significant position, so k-mers up to 64 bases are supported.
//!
//! Encoding:
//! - A (65/97)  -> 00
//! - C (67/99)  -> 01
//! - G (71/103) -> 11
//! - T (84/116) -> 10

use crate::constants::MAX_KMER_SIZE;
use thiserror::Error;

/// Error type for encoding operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The input byte is not a valid DNA base (A/C/G/T)
    #[error("Invalid DNA base {base:?} at position {position}")]
    InvalidBase {
        /// Offending byte
        base: u8,
        /// Position inside the k-mer
        position: usize,
    },
    /// The k-mer is empty or longer than the packed representation allows
    #[error("K-mer length {0} is outside 1..={max}", max = MAX_KMER_SIZE)]
    InvalidLength(usize),
}

/// Encode a single DNA nucleotide to 2 bits
#[inline]
pub const fn encode_base(base: u8) -> Option<u8> {
    match base {
        b'A' | b'a' => Some(0b00),
        b'C' | b'c' => Some(0b01),
        b'G' | b'g' => Some(0b11),
        b'T' | b't' => Some(0b10),
        _ => None,
    }
}

/// Decode a 2-bit value to DNA nucleotide (uppercase)
#[inline]
pub const fn decode_base(bits: u8) -> u8 {
    match bits & 0b11 {
        0b00 => b'A',
        0b01 => b'C',
        0b11 => b'G',
        _ => b'T',
    }
}

/// Get the complement of a DNA base (encoded)
#[inline]
pub const fn complement_base(bits: u8) -> u8 {
    // A(00) <-> T(10), C(01) <-> G(11)
    bits ^ 0b10
}

/// Pack a k-mer into its 2-bit representation
///
/// # Errors
/// Returns an error if the k-mer is empty, longer than 64 bases, or
/// contains a symbol outside the nucleotide alphabet
pub fn encode_kmer(kmer: &[u8]) -> Result<u128, EncodingError> {
    if kmer.is_empty() || kmer.len() > MAX_KMER_SIZE {
        return Err(EncodingError::InvalidLength(kmer.len()));
    }
    let mut code = 0u128;
    for (position, &base) in kmer.iter().enumerate() {
        let bits = encode_base(base).ok_or(EncodingError::InvalidBase { base, position })?;
        code = (code << 2) | bits as u128;
    }
    Ok(code)
}

/// Reverse complement of a packed k-mer of length `k`
pub fn reverse_complement(code: u128, k: usize) -> u128 {
    let mut fwd = code;
    let mut rc = 0u128;
    for _ in 0..k {
        let bits = complement_base((fwd & 0b11) as u8);
        rc = (rc << 2) | bits as u128;
        fwd >>= 2;
    }
    rc
}

/// Unpack a k-mer of length `k` back to uppercase text
pub fn decode_kmer(code: u128, k: usize) -> String {
    (0..k)
        .map(|i| {
            let shift = 2 * (k - 1 - i);
            decode_base(((code >> shift) & 0b11) as u8) as char
        })
        .collect()
}

/// Normalize a raw k-mer into the form that gets hashed
///
/// Returns `None` when the k-mer contains anything other than A, C, G or T
/// (either case). With `canonical` set, the smaller of the forward and
/// reverse-complement codes is returned so both strands hash alike.
#[inline]
pub fn prep_kmer(kmer: &[u8], canonical: bool) -> Option<u128> {
    let code = encode_kmer(kmer).ok()?;
    if canonical {
        Some(code.min(reverse_complement(code, kmer.len())))
    } else {
        Some(code)
    }
}
