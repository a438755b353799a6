//! Scanner module for directory indexing and file hashing.
//!
//! This module provides functionality for:
//! - Single-threaded directory indexing with name, keyword and size filters
//! - Streaming content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`indexer`]: Directory traversal and per-file record collection
//! - [`hasher`]: BLAKE3 file hashing (64 KiB streaming chunks)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{FileIndexer, IndexerConfig};
//! use std::path::Path;
//!
//! let config = IndexerConfig {
//!     min_size: 1024, // Skip files under 1KB
//!     exclude_keywords: vec!["node_modules".to_string()],
//!     ..Default::default()
//! };
//!
//! let result = FileIndexer::new(Path::new("."), config).unwrap().index();
//! for record in &result.records {
//!     println!("{}: {} bytes", record.path.display(), record.size);
//! }
//! println!("{} excluded", result.stats.excluded());
//! ```

pub mod hasher;
pub mod indexer;

use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use hasher::{hash_to_hex, Digest, Hasher, CHUNK_SIZE};
pub use indexer::{FileIndexer, IndexResult, IndexStats};

/// Metadata for an indexed file.
///
/// Records are immutable once produced by the indexer. Their ordering
/// (see [`original_order`]) decides which member of a duplicate set is
/// reported as the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRecord {
    /// Creation time (birth time where the platform reports one)
    pub created: SystemTime,
    /// Last modification time
    pub modified: SystemTime,
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    ///
    /// # Arguments
    ///
    /// * `path` - Absolute path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    /// * `created` - Creation time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime, created: SystemTime) -> Self {
        Self {
            created,
            modified,
            path,
            size,
        }
    }
}

/// Comparator that selects the original of a duplicate set.
///
/// Records compare by creation time, then modification time, then path,
/// then size, all ascending. Paths compare as plain strings, not component
/// by component, so `/d/a.b` sorts before `/d/a/b`. The minimum record of a
/// bucket is its original.
///
/// # Example
///
/// ```
/// use dupescan::scanner::{original_order, FileRecord};
/// use std::path::PathBuf;
/// use std::time::{Duration, SystemTime};
///
/// let t = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
/// let older = FileRecord::new(PathBuf::from("/b.txt"), 10, t, t);
/// let newer = FileRecord::new(PathBuf::from("/a.txt"), 10, t, t + Duration::from_secs(1));
///
/// assert!(original_order(&older, &newer).is_lt());
/// ```
#[must_use]
pub fn original_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.created
        .cmp(&b.created)
        .then_with(|| a.modified.cmp(&b.modified))
        .then_with(|| a.path.as_os_str().cmp(b.path.as_os_str()))
        .then_with(|| a.size.cmp(&b.size))
}

impl Ord for FileRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        original_order(self, other)
    }
}

impl PartialOrd for FileRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Configuration for directory indexing.
///
/// Controls the filename pattern, traversal depth, keyword exclusion and
/// the minimum size threshold.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Shell-style glob applied to the file name only (default `*`).
    pub pattern: String,

    /// Only index the root directory's direct children.
    pub current_folder_only: bool,

    /// Case-insensitive substrings; a file whose absolute path contains
    /// any of them is excluded.
    pub exclude_keywords: Vec<String>,

    /// Files strictly smaller than this many bytes are excluded.
    pub min_size: u64,

    /// Descend into symlinked directories.
    /// Warning: May revisit files when symlinks form cycles.
    pub follow_symlinks: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            pattern: "*".to_string(),
            current_folder_only: false,
            exclude_keywords: Vec::new(),
            min_size: 0,
            follow_symlinks: false,
        }
    }
}

impl IndexerConfig {
    /// Set the filename pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Restrict indexing to the root directory.
    #[must_use]
    pub fn with_current_folder_only(mut self, enabled: bool) -> Self {
        self.current_folder_only = enabled;
        self
    }

    /// Set the path keywords to exclude.
    #[must_use]
    pub fn with_exclude_keywords(mut self, keywords: Vec<String>) -> Self {
        self.exclude_keywords = keywords;
        self
    }

    /// Set the minimum file size in bytes.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Follow symlinked directories.
    #[must_use]
    pub fn with_follow_symlinks(mut self, enabled: bool) -> Self {
        self.follow_symlinks = enabled;
        self
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The filename pattern is not a valid glob.
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Build a scan error from an I/O error, keeping the common kinds distinct.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: std::sync::Arc::new(error),
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },
}
