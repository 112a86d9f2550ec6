//! Bloom filters over k-mers and their companion metadata
//!
//! A filter is persisted as two files:
//! - the raw bit array (`<name>.bf`), 64-bit words in little-endian order
//! - a plain-text metadata file (`<name>.txt`) carrying the parameters
//!   needed to reload it (size in bits, hash count, k-mer size) plus
//!   build statistics
//!
//! The metadata path is derived from the filter path by replacing its last
//! two characters with `txt`, see [`info_path_for`].

mod filter;
mod info;

pub use self::filter::{info_path_for, BloomFilter};
pub use self::info::FilterInfo;
