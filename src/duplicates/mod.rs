//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Parallel content hashing of same-size candidates
//! - Original selection and duplicate pairing
//! - Pipeline orchestration via [`DuplicateFinder`]

pub mod finder;
pub mod groups;
pub mod resolver;

pub use finder::{
    default_io_threads, format_size, hash_size_groups, DuplicateFinder, FinderConfig,
    FinderError, HashConfig, HashStats, ScanSummary,
};
pub use groups::{group_by_size, GroupingStats};
pub use resolver::{DuplicatePair, DuplicateResolver, Resolution};
