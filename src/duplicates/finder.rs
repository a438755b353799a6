//! Duplicate finder pipeline.
//!
//! # Overview
//!
//! The pipeline runs four stages, each fully drained before the next:
//!
//! 1. **Index** - walk the tree and collect [`FileRecord`]s
//! 2. **Size grouping** - bucket records by exact size
//! 3. **Hashing** (content mode only) - split size buckets by BLAKE3 digest
//! 4. **Resolution** - pick an original per bucket and pair the rest with it
//!
//! In size-only mode every same-size bucket is reported, so files with equal
//! sizes but different content show up as duplicates. Content mode removes
//! those false positives at the cost of reading every candidate file.
//!
//! # Hashing
//!
//! All candidate files are flattened into one list and hashed on a single
//! rayon pool bounded by `io_threads`. Workers return immutable results and
//! the hash buckets are built afterwards by one owner, so bucket membership
//! does not depend on completion order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::group_by_size;
use super::resolver::{DuplicatePair, DuplicateResolver, Resolution};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_INDEXING};
use crate::scanner::{Digest, FileIndexer, FileRecord, HashError, Hasher, IndexerConfig, ScanError};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Default hashing parallelism: one worker per available core.
#[must_use]
pub fn default_io_threads() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Configuration for the hashing phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of worker threads in the hashing pool.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: default_io_threads(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the number of hashing threads (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the hashing phase.
#[derive(Debug, Clone, Default)]
pub struct HashStats {
    /// Files that entered the phase
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files whose hash failed (excluded from duplicate consideration)
    pub failed_files: usize,
    /// Errors for the failed files
    pub errors: Vec<HashError>,
    /// Total bytes hashed
    pub bytes_hashed: u64,
    /// Whether the phase stopped early on shutdown
    pub interrupted: bool,
}

/// Outcome of one hashing task. `None` means the task was skipped on shutdown.
type HashOutcome = (FileRecord, Option<Result<Digest, HashError>>);

/// Split size buckets into hash buckets.
///
/// Every file of every bucket is hashed on one pool of
/// `config.io_threads` workers. Files that fail to hash are logged,
/// counted and left out of the returned buckets. Buckets are returned
/// regardless of member count; resolution ignores singletons.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::{hash_size_groups, HashConfig};
/// use dupescan::scanner::{FileRecord, Hasher};
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// let size_groups: HashMap<u64, Vec<FileRecord>> = HashMap::new();
/// let (buckets, stats) =
///     hash_size_groups(size_groups, Arc::new(Hasher::new()), HashConfig::default());
/// println!("{} hashed, {} failed", stats.hashed_files, stats.failed_files);
/// ```
#[must_use]
pub fn hash_size_groups(
    size_groups: HashMap<u64, Vec<FileRecord>>,
    hasher: Arc<Hasher>,
    config: HashConfig,
) -> (HashMap<(u64, Digest), Vec<FileRecord>>, HashStats) {
    let all_files: Vec<FileRecord> = size_groups
        .into_values()
        .filter(|files| files.len() > 1)
        .flatten()
        .collect();

    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Hashing: No files to process");
        return (HashMap::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_HASHING, all_files.len());
    }

    log::info!(
        "Hashing {} files on {} threads",
        all_files.len(),
        config.io_threads
    );

    let completed = AtomicUsize::new(0);
    let job = || -> Vec<HashOutcome> {
        all_files
            .into_par_iter()
            .map(|file| {
                if config.is_shutdown_requested() {
                    log::trace!("Hashing: Shutdown requested, skipping {}", file.path.display());
                    return (file, None);
                }

                if file.size > LARGE_FILE_THRESHOLD {
                    log::debug!(
                        "Hashing large file ({} MB): {}",
                        file.size / (1024 * 1024),
                        file.path.display()
                    );
                }

                let result = hasher.full_hash(&file.path);
                if let Err(ref e) = result {
                    if !matches!(e, HashError::Interrupted(_)) {
                        log::warn!("Failed to hash {}: {}", file.path.display(), e);
                    }
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(done, file.path.to_string_lossy().as_ref());
                }

                (file, Some(result))
            })
            .collect()
    };

    let outcomes = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads)
        .build()
    {
        Ok(pool) => pool.install(job),
        Err(e) => {
            log::warn!(
                "Failed to create hashing pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            job()
        }
    };

    let mut buckets: HashMap<(u64, Digest), Vec<FileRecord>> = HashMap::new();
    for (file, outcome) in outcomes {
        match outcome {
            Some(Ok(digest)) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                buckets.entry((file.size, digest)).or_default().push(file);
            }
            Some(Err(HashError::Interrupted(_))) | None => stats.interrupted = true,
            Some(Err(e)) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    if config.is_shutdown_requested() {
        stats.interrupted = true;
    }
    if stats.interrupted {
        log::info!("Hashing: Interrupted by shutdown signal");
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_HASHING);
    }

    log::info!(
        "Hashing complete: {} hashed, {} failed, {} buckets",
        stats.hashed_files,
        stats.failed_files,
        buckets.len()
    );

    (buckets, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Filters applied while indexing.
    pub indexer_config: IndexerConfig,
    /// Confirm same-size files by content hash.
    pub check_contents: bool,
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("indexer_config", &self.indexer_config)
            .field("check_contents", &self.check_contents)
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            indexer_config: IndexerConfig::default(),
            check_contents: false,
            io_threads: default_io_threads(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the indexing filters.
    #[must_use]
    pub fn with_indexer_config(mut self, config: IndexerConfig) -> Self {
        self.indexer_config = config;
        self
    }

    /// Enable or disable content-hash confirmation.
    #[must_use]
    pub fn with_check_contents(mut self, enabled: bool) -> Self {
        self.check_contents = enabled;
        self
    }

    /// Set the number of hashing threads (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Number of files considered (passed every filter)
    pub total_files: usize,
    /// Files rejected by keyword, size or because they could not be read
    pub excluded_files: usize,
    /// Files rejected by an exclude keyword
    pub excluded_by_keyword: usize,
    /// Files rejected by the minimum size
    pub excluded_by_size: usize,
    /// Total size of considered files in bytes
    pub total_size: u64,
    /// Files that share their size with at least one other file
    pub candidate_files: usize,
    /// Number of buckets that produced duplicates
    pub duplicate_groups: usize,
    /// Number of files reported as duplicates
    pub duplicate_count: usize,
    /// Bytes held by duplicates
    pub duplicate_size: u64,
    /// Files hashed (content mode)
    pub hashed_files: usize,
    /// Files that failed to hash (content mode)
    pub failed_files: usize,
    /// Whether content hashing was used
    pub check_contents: bool,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Non-fatal errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of the considered bytes held by duplicates.
    #[must_use]
    pub fn duplicate_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.duplicate_size as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Duplicate size as a human-readable string.
    #[must_use]
    pub fn duplicate_size_display(&self) -> String {
        format_size(self.duplicate_size)
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }

    fn apply_resolution(&mut self, resolution: &Resolution) {
        self.duplicate_groups = resolution.duplicate_groups;
        self.duplicate_count = resolution.duplicate_count;
        self.duplicate_size = resolution.duplicate_size;
    }
}

/// Format a byte size with binary units and two decimals.
///
/// # Example
///
/// ```
/// use dupescan::duplicates::format_size;
///
/// assert_eq!(format_size(512), "512.00 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} B", bytes as f64)
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while validating the root.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scan error occurred (for example an invalid pattern).
    #[error(transparent)]
    ScanError(#[from] ScanError),
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_check_contents(true);
/// let finder = DuplicateFinder::new(config);
///
/// let (pairs, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
/// for pair in &pairs {
///     println!("{} ({})", pair.duplicate.path.display(), pair.original.path.display());
/// }
/// println!("Duplicates use {}", summary.duplicate_size_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The filename pattern is invalid
    /// - The scan is interrupted by shutdown signal
    ///
    /// Files that cannot be read are not errors; they are skipped and
    /// recorded in [`ScanSummary::scan_errors`].
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicatePair>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        let mut indexer = FileIndexer::new(root, self.config.indexer_config.clone())?;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Starting duplicate scan of {}", indexer.root().display());

        if let Some(ref flag) = self.config.shutdown_flag {
            indexer = indexer.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            indexer = indexer.with_progress_callback(callback.clone());
            callback.on_phase_start(PHASE_INDEXING, 0);
            callback.on_message(&format!("Scanning {}", indexer.root().display()));
        }

        let indexed = indexer.index();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_INDEXING);
        }

        if indexed.stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let stats = indexed.stats;
        log::info!(
            "Found {} files to process ({}). Excluded {} files based on keywords or size",
            stats.accepted,
            format_size(stats.total_size),
            stats.excluded()
        );

        let mut summary = ScanSummary {
            total_files: stats.accepted,
            excluded_files: stats.excluded(),
            excluded_by_keyword: stats.excluded_by_keyword,
            excluded_by_size: stats.excluded_by_size,
            total_size: stats.total_size,
            scan_errors: stats.errors,
            ..Default::default()
        };

        let pairs = self.detect(indexed.records, &mut summary)?;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate files in {} groups, {} in duplicates",
            summary.duplicate_count,
            summary.duplicate_groups,
            summary.duplicate_size_display()
        );

        Ok((pairs, summary))
    }

    /// Find duplicates in a pre-collected list of records.
    ///
    /// Runs grouping, optional hashing and resolution without walking a
    /// directory. Exclusion counters in the summary stay at zero.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown is requested.
    pub fn find_duplicates_from_records(
        &self,
        records: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicatePair>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut summary = ScanSummary {
            total_files: records.len(),
            total_size: records.iter().map(|r| r.size).sum(),
            ..Default::default()
        };

        let pairs = self.detect(records, &mut summary)?;
        summary.scan_duration = start_time.elapsed();
        Ok((pairs, summary))
    }

    /// Group, optionally hash, and resolve `records`.
    fn detect(
        &self,
        records: Vec<FileRecord>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<DuplicatePair>, FinderError> {
        summary.check_contents = self.config.check_contents;

        let (size_groups, grouping) = group_by_size(records);
        summary.candidate_files = grouping.potential_duplicates;
        let mut resolver = DuplicateResolver::new();

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            return Ok(Vec::new());
        }

        if self.config.check_contents {
            let hash_config = HashConfig {
                io_threads: self.config.io_threads,
                shutdown_flag: self.config.shutdown_flag.clone(),
                progress_callback: self.config.progress_callback.clone(),
            };
            let (buckets, hash_stats) =
                hash_size_groups(size_groups, self.hasher.clone(), hash_config);

            if hash_stats.interrupted || self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }

            summary.hashed_files = hash_stats.hashed_files;
            summary.failed_files = hash_stats.failed_files;
            summary
                .scan_errors
                .extend(hash_stats.errors.into_iter().map(ScanError::from));

            for ((size, digest), members) in buckets {
                if members.len() > 1 {
                    log::debug!(
                        "Found {} duplicate files with hash {}...",
                        members.len(),
                        &crate::scanner::hash_to_hex(&digest)[..8]
                    );
                }
                resolver.resolve(size, members);
            }
        } else {
            for (size, members) in size_groups {
                resolver.resolve(size, members);
            }
        }

        let resolution = resolver.finish();
        summary.apply_resolution(&resolution);
        Ok(resolution.pairs)
    }
}
