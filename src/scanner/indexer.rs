//! Directory indexer built on walkdir.
//!
//! # Overview
//!
//! This module provides the [`FileIndexer`] struct, which walks a directory
//! tree on the calling thread and produces one [`FileRecord`] per regular
//! file that passes every filter.
//!
//! # Filters
//!
//! Applied in this order:
//!
//! 1. Filename pattern (shell glob on the file name only)
//! 2. Path keywords (case-insensitive substring of the absolute path)
//! 3. Minimum size (files strictly smaller are excluded)
//!
//! Files that fail the pattern are ignored silently. Keyword and size
//! exclusions are counted separately in [`IndexStats`]. Entries that
//! cannot be stat'ed are logged, counted as unreadable and skipped; they
//! never abort the walk.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{FileIndexer, IndexerConfig};
//! use std::path::Path;
//!
//! let config = IndexerConfig::default().with_pattern("*.jpg");
//! let indexer = FileIndexer::new(Path::new("/home/user/Pictures"), config).unwrap();
//! let result = indexer.index();
//!
//! println!(
//!     "{} files ({} bytes), {} excluded",
//!     result.stats.accepted,
//!     result.stats.total_size,
//!     result.stats.excluded()
//! );
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use glob::Pattern;
use walkdir::WalkDir;

use super::{FileRecord, IndexerConfig, ScanError};
use crate::progress::ProgressCallback;

/// Counters produced by one indexing pass.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Files that passed every filter
    pub accepted: usize,
    /// Files excluded because their path contains an exclude keyword
    pub excluded_by_keyword: usize,
    /// Files excluded for being smaller than the minimum size
    pub excluded_by_size: usize,
    /// Files that matched the pattern but could not be stat'ed
    pub unreadable: usize,
    /// Total size of accepted files in bytes
    pub total_size: u64,
    /// Errors encountered during the walk (non-fatal)
    pub errors: Vec<ScanError>,
    /// Whether the walk stopped early on shutdown
    pub interrupted: bool,
}

impl IndexStats {
    /// All files rejected after matching the pattern.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.excluded_by_keyword + self.excluded_by_size + self.unreadable
    }
}

/// Output of [`FileIndexer::index`].
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    /// Accepted file records in walk order
    pub records: Vec<FileRecord>,
    /// Counters for the pass
    pub stats: IndexStats,
}

/// Directory indexer for file discovery.
pub struct FileIndexer {
    /// Absolute root path to walk
    root: PathBuf,
    /// Indexer configuration
    config: IndexerConfig,
    /// Compiled filename pattern
    pattern: Pattern,
    /// Exclude keywords, lowercased, empty entries removed
    keywords: Vec<String>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, notified per accepted file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FileIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIndexer")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FileIndexer {
    /// Create a new indexer for the given root.
    ///
    /// The root is made absolute (without resolving symlinks) so every
    /// produced path is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] if the filename pattern is not
    /// a valid glob.
    pub fn new(root: &Path, config: IndexerConfig) -> Result<Self, ScanError> {
        let pattern = Pattern::new(&config.pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: config.pattern.clone(),
            message: e.msg.to_string(),
        })?;

        let keywords = config
            .exclude_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let root = std::path::absolute(root).unwrap_or_else(|e| {
            log::debug!("Could not make {} absolute: {}", root.display(), e);
            root.to_path_buf()
        });

        Ok(Self {
            root,
            config,
            pattern,
            keywords,
            shutdown_flag: None,
            progress_callback: None,
        })
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The absolute root this indexer walks.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check whether any exclude keyword occurs in the path.
    fn is_excluded_by_keyword(&self, path: &Path) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let haystack = path.to_string_lossy().to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    /// Walk the tree and collect every accepted record.
    ///
    /// Directory entries are visited in file-name order so repeated runs
    /// over an unchanged tree produce the same record sequence.
    #[must_use]
    pub fn index(&self) -> IndexResult {
        let mut result = IndexResult::default();

        let mut walk = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if self.config.current_folder_only {
            walk = walk.max_depth(1);
        }

        for entry in walk {
            if self.is_shutdown_requested() {
                log::debug!("Indexer: Shutdown requested, stopping walk");
                result.stats.interrupted = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    let err = match e.into_io_error() {
                        Some(io) => ScanError::from_io(path, io),
                        None => ScanError::Io {
                            path,
                            source: Arc::new(std::io::Error::other("filesystem loop detected")),
                        },
                    };
                    result.stats.errors.push(err);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            if !self.pattern.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let path = entry.into_path();
            self.process_file(path, &mut result);
        }

        log::debug!(
            "Indexed {}: {} accepted, {} excluded by keyword, {} excluded by size, {} unreadable",
            self.root.display(),
            result.stats.accepted,
            result.stats.excluded_by_keyword,
            result.stats.excluded_by_size,
            result.stats.unreadable
        );

        result
    }

    /// Apply keyword and size filters to a pattern-matched path.
    fn process_file(&self, path: PathBuf, result: &mut IndexResult) {
        if self.is_excluded_by_keyword(&path) {
            log::trace!("Excluding file by keyword: {}", path.display());
            result.stats.excluded_by_keyword += 1;
            return;
        }

        // Stat through symlinks so links to files are indexed as their target
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Error accessing file {}: {}", path.display(), e);
                result.stats.unreadable += 1;
                result.stats.errors.push(ScanError::from_io(path, e));
                return;
            }
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return;
        }

        let size = metadata.len();
        if size < self.config.min_size {
            log::trace!(
                "Excluding file below minimum size ({} < {}): {}",
                size,
                self.config.min_size,
                path.display()
            );
            result.stats.excluded_by_size += 1;
            return;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = creation_time(&metadata, modified);

        result.stats.accepted += 1;
        result.stats.total_size += size;

        if let Some(ref callback) = self.progress_callback {
            callback.on_progress(result.stats.accepted, path.to_string_lossy().as_ref());
        }

        result
            .records
            .push(FileRecord::new(path, size, modified, created));
    }
}

/// Best available creation time for a file.
///
/// Uses the birth time when the platform reports one, the inode change
/// time on other Unix filesystems, and the modification time otherwise.
fn creation_time(metadata: &Metadata, modified: SystemTime) -> SystemTime {
    if let Ok(created) = metadata.created() {
        return created;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let (Ok(secs), Ok(nanos)) = (
            u64::try_from(metadata.ctime()),
            u32::try_from(metadata.ctime_nsec()),
        ) {
            return SystemTime::UNIX_EPOCH + std::time::Duration::new(secs, nanos);
        }
    }

    modified
}
