//! Deterministic multi-hashing of packed k-mers.
//!
//! Filters are written to disk and reloaded on other machines, so the hash
//! must not depend on process-level randomness or platform features. Two
//! seeded split-mix finalizers give a pair of base hashes and the remaining
//! values are derived by double hashing.

/// Seeds for the two base hashes
const SEED_H1: u64 = 0x9e37_79b9_7f4a_7c15;
const SEED_H2: u64 = 0x3c79_ac49_2ba7_b653;

#[inline]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// A deterministic hasher for packed k-mers with a fixed seed
#[derive(Clone, Copy, Debug)]
pub struct KmerHasher {
    seed: u64,
}

impl KmerHasher {
    /// Create a new hasher with the given seed
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Hash a packed k-mer of length `k`
    ///
    /// The length takes part in the hash so that `A` and `AA` (both zero
    /// when packed) do not collide.
    #[inline]
    pub fn hash_kmer(&self, code: u128, k: usize) -> u64 {
        let lo = code as u64;
        let hi = (code >> 64) as u64;
        let h = mix64(lo ^ self.seed);
        let h = mix64(h ^ hi.rotate_left(17) ^ (k as u64).wrapping_mul(0xff51_afd7_ed55_8ccd));
        mix64(h ^ self.seed.rotate_left(32))
    }

    /// Get the seed value
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Compute `hash_num` hash values for a packed k-mer of length `k`
///
/// Values are not reduced modulo the filter size; each filter does that
/// itself, which lets one hash vector be tested against filters of
/// different sizes.
pub fn multi_hash(code: u128, k: usize, hash_num: usize) -> Vec<u64> {
    let h1 = KmerHasher::new(SEED_H1).hash_kmer(code, k);
    let h2 = KmerHasher::new(SEED_H2).hash_kmer(code, k) | 1;
    (0..hash_num as u64)
        .map(|i| h1.wrapping_add(i.wrapping_mul(h2)))
        .collect()
}
