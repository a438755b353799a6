//! Original selection within duplicate buckets.
//!
//! Every final bucket (a size bucket in size-only mode, a hash bucket in
//! content mode) is resolved the same way: members are sorted with
//! [`original_order`], the first becomes the original and each remaining
//! member is paired with it.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::DuplicateResolver;
//! use dupescan::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::{Duration, SystemTime};
//!
//! let t = SystemTime::UNIX_EPOCH;
//! let old = FileRecord::new(PathBuf::from("/b"), 10, t, t);
//! let new = FileRecord::new(PathBuf::from("/a"), 10, t, t + Duration::from_secs(5));
//!
//! let mut resolver = DuplicateResolver::new();
//! resolver.resolve(10, vec![new, old]);
//! let resolution = resolver.finish();
//!
//! assert_eq!(resolution.pairs[0].original.path, PathBuf::from("/b"));
//! assert_eq!(resolution.duplicate_size, 10);
//! ```

use crate::scanner::{original_order, FileRecord};

/// A file reported as a copy of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePair {
    /// The file considered redundant
    pub duplicate: FileRecord,
    /// The earliest member of the duplicate's bucket
    pub original: FileRecord,
}

/// Accumulated output of a [`DuplicateResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Pairs ordered by original, then duplicate
    pub pairs: Vec<DuplicatePair>,
    /// Number of files reported as duplicates
    pub duplicate_count: usize,
    /// Number of buckets that produced at least one pair
    pub duplicate_groups: usize,
    /// Bytes held by duplicates (one copy per bucket excluded)
    pub duplicate_size: u64,
}

/// Turns duplicate buckets into [`DuplicatePair`]s.
#[derive(Debug, Default)]
pub struct DuplicateResolver {
    resolution: Resolution,
}

impl DuplicateResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one bucket of same-size (and possibly same-digest) files.
    ///
    /// Buckets with fewer than two members are ignored.
    pub fn resolve(&mut self, size: u64, mut members: Vec<FileRecord>) {
        if members.len() < 2 {
            return;
        }

        members.sort_by(original_order);
        let count = members.len();
        let mut iter = members.into_iter();
        let Some(original) = iter.next() else {
            return;
        };

        log::debug!(
            "Found {} files of {} bytes matching {}",
            count,
            size,
            original.path.display()
        );

        for duplicate in iter {
            self.resolution.pairs.push(DuplicatePair {
                duplicate,
                original: original.clone(),
            });
        }

        self.resolution.duplicate_count += count - 1;
        self.resolution.duplicate_groups += 1;
        self.resolution.duplicate_size += size * (count as u64 - 1);
    }

    /// Finish resolution, ordering pairs for stable reports.
    #[must_use]
    pub fn finish(mut self) -> Resolution {
        self.resolution.pairs.sort_by(|a, b| {
            original_order(&a.original, &b.original)
                .then_with(|| original_order(&a.duplicate, &b.duplicate))
        });
        self.resolution
    }
}
