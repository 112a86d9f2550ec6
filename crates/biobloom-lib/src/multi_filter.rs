//! A named set of Bloom filters queried with one shared hash computation
//!
//! All filters of a set use the same hash count, k-mer size and strand
//! handling, so a k-mer is hashed once and the hash vector is tested against
//! every filter. Keeping the parameters in line is up to the caller; see
//! [`crate::classify::load_filter_set`] for a loader that checks them.

use ahash::AHashMap;
use std::sync::Arc;

use crate::bloom::BloomFilter;
use crate::error::{BloomError, Result};

/// Filters in registration order, addressable by name
#[derive(Debug, Clone)]
pub struct FilterSet {
    hash_num: usize,
    kmer_size: usize,
    names: Vec<String>,
    filters: Vec<Arc<BloomFilter>>,
    slots: AHashMap<String, usize>,
}

impl FilterSet {
    /// Create an empty set for filters with the given parameters
    pub fn new(hash_num: usize, kmer_size: usize) -> Self {
        Self {
            hash_num,
            kmer_size,
            names: Vec::new(),
            filters: Vec::new(),
            slots: AHashMap::new(),
        }
    }

    /// Register `filter` under `name`
    ///
    /// Registering a name twice replaces the earlier filter and keeps its
    /// position in the order.
    pub fn add_filter(&mut self, name: &str, filter: Arc<BloomFilter>) {
        if let Some(&slot) = self.slots.get(name) {
            self.filters[slot] = filter;
            return;
        }
        self.slots.insert(name.to_string(), self.names.len());
        self.names.push(name.to_string());
        self.filters.push(filter);
    }

    /// Shared hash vector of a raw k-mer, `None` if it is invalid
    #[inline]
    fn shared_hash(&self, kmer: &[u8]) -> Option<Vec<u64>> {
        self.filters.first()?.multi_hash(kmer)
    }

    /// Test `kmer` against every filter in registration order
    ///
    /// Returns `None` for k-mers of the wrong length or with symbols
    /// outside A/C/G/T, and for an empty set.
    pub fn query_all(&self, kmer: &[u8]) -> Option<Vec<bool>> {
        let hashes = self.shared_hash(kmer)?;
        Some(self.filters.iter().map(|f| f.contains(&hashes)).collect())
    }

    /// [`query_all`](Self::query_all) keyed by filter name
    pub fn query_all_named(&self, kmer: &[u8]) -> Option<AHashMap<String, bool>> {
        let hits = self.query_all(kmer)?;
        Some(self.names.iter().cloned().zip(hits).collect())
    }

    /// Test `kmer` against the named filters only, aligned with `names`
    ///
    /// # Errors
    /// [`BloomError::FilterNotFound`] if a name was never registered.
    pub fn query_subset(&self, kmer: &[u8], names: &[&str]) -> Result<Option<Vec<bool>>> {
        let slots = names
            .iter()
            .map(|name| {
                self.slots
                    .get(*name)
                    .copied()
                    .ok_or_else(|| BloomError::FilterNotFound(name.to_string()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let Some(hashes) = self.shared_hash(kmer) else {
            return Ok(None);
        };
        Ok(Some(
            slots
                .into_iter()
                .map(|slot| self.filters[slot].contains(&hashes))
                .collect(),
        ))
    }

    /// Filter names in registration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Filter registered under `name`
    pub fn get(&self, name: &str) -> Result<&Arc<BloomFilter>> {
        self.slots
            .get(name)
            .map(|&slot| &self.filters[slot])
            .ok_or_else(|| BloomError::FilterNotFound(name.to_string()))
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filter is registered
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Shared number of hash functions
    pub fn hash_num(&self) -> usize {
        self.hash_num
    }

    /// Shared k-mer length
    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::decode_kmer;

    fn filter_with(size: u64, kmers: &[&str]) -> Arc<BloomFilter> {
        let filter = BloomFilter::new(size, 3, 6);
        for kmer in kmers {
            assert!(filter.insert_kmer(kmer.as_bytes()));
        }
        Arc::new(filter)
    }

    #[test]
    fn test_query_all_in_registration_order() {
        let mut set = FilterSet::new(3, 6);
        set.add_filter("b", filter_with(4096, &["AAAAAA", "CCCCCC"]));
        set.add_filter("a", filter_with(8192, &["CCCCCC"]));

        assert_eq!(set.names(), &["b", "a"]);
        assert_eq!(set.query_all(b"AAAAAA"), Some(vec![true, false]));
        assert_eq!(set.query_all(b"CCCCCC"), Some(vec![true, true]));

        let named = set.query_all_named(b"AAAAAA").unwrap();
        assert!(named["b"]);
        assert!(!named["a"]);
    }

    #[test]
    fn test_invalid_kmer_and_empty_set() {
        let mut set = FilterSet::new(3, 6);
        assert_eq!(set.query_all(b"AAAAAA"), None);
        assert!(set.is_empty());

        set.add_filter("x", filter_with(4096, &["AAAAAA"]));
        assert_eq!(set.query_all(b"AAANAA"), None);
        assert_eq!(set.query_all(b"AAAAA"), None);
    }

    #[test]
    fn test_shared_hash_matches_individual_queries() {
        let mut set = FilterSet::new(3, 6);
        let inserted: Vec<String> = (0..200u128).map(|c| decode_kmer(c * 13, 6)).collect();
        let refs: Vec<&str> = inserted.iter().map(String::as_str).collect();
        set.add_filter("small", filter_with(1000, &refs[..50]));
        set.add_filter("large", filter_with(100_000, &refs[100..]));
        set.add_filter("mid", filter_with(7777, &refs[25..150]));

        for code in 0..4096u128 {
            let kmer = decode_kmer(code, 6);
            let expected: Vec<bool> = set
                .names()
                .iter()
                .map(|name| set.get(name).unwrap().contains_kmer(kmer.as_bytes()))
                .collect();
            assert_eq!(set.query_all(kmer.as_bytes()), Some(expected));
        }
    }

    #[test]
    fn test_query_subset() {
        let mut set = FilterSet::new(3, 6);
        set.add_filter("a", filter_with(4096, &["ACGTAC"]));
        set.add_filter("b", filter_with(4096, &["TTTTTT"]));
        set.add_filter("c", filter_with(4096, &["ACGTAC"]));

        assert_eq!(
            set.query_subset(b"ACGTAC", &["c", "b"]).unwrap(),
            Some(vec![true, false])
        );
        assert_eq!(set.query_subset(b"ACGNAC", &["a"]).unwrap(), None);
        assert!(matches!(
            set.query_subset(b"ACGTAC", &["a", "zzz"]),
            Err(BloomError::FilterNotFound(name)) if name == "zzz"
        ));
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut set = FilterSet::new(3, 6);
        set.add_filter("a", filter_with(4096, &["AAAAAA"]));
        set.add_filter("b", filter_with(4096, &["CCCCCC"]));
        set.add_filter("a", filter_with(4096, &["GGGGGG"]));

        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), &["a", "b"]);
        assert_eq!(set.query_all(b"GGGGGG"), Some(vec![true, false]));
        assert_eq!(set.query_all(b"AAAAAA"), Some(vec![false, false]));
    }

    #[test]
    fn test_get_unknown() {
        let set = FilterSet::new(3, 6);
        assert!(matches!(set.get("nope"), Err(BloomError::FilterNotFound(_))));
    }
}
