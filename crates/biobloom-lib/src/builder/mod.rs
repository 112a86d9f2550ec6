//! Builder module for constructing Bloom filters
//!
//! A build runs in three steps:
//! 1. Load the `.fai` index of every input file and size the filter
//! 2. Stream each record in overlapping blocks to a pool of workers
//! 3. Write the bit array and its metadata file

pub mod config;
pub mod filter_builder;

pub use config::BuildConfiguration;
pub use filter_builder::FilterBuilder;
