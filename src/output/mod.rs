//! Report writers for resolved duplicates.
//!
//! This module renders [`DuplicatePair`]s in three formats:
//! - Plain text: one duplicate path per line
//! - CSV for spreadsheet import
//! - JSON for scripting
//!
//! CSV and JSON share the same five fields per duplicate (see
//! [`ReportRow`]). Timestamps are local time formatted as
//! `YYYY-MM-DD HH:MM:SS`.
//!
//! Reports are rendered fully in memory and written with
//! [`write_atomic`], so a failed write never leaves a partial file behind.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::output::{write_atomic, CsvOutput};
//! use std::path::Path;
//!
//! let (pairs, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! let csv = CsvOutput::new(&pairs).to_string().unwrap();
//! write_atomic(Path::new("dupes.csv"), csv.as_bytes()).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::duplicates::DuplicatePair;

// Re-export main types
pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Timestamp layout used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while rendering or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// I/O error while writing the report file.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Report destination
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while rendering into a buffer.
    #[error("I/O error: {0}")]
    Render(#[from] std::io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One duplicate as it appears in CSV and JSON reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Path of the duplicate
    #[serde(rename = "Duplicate Filepath")]
    pub duplicate: String,
    /// Path of the original it duplicates
    #[serde(rename = "Original Filepath")]
    pub original: String,
    /// Size of the duplicate in bytes
    #[serde(rename = "Filesize (bytes)")]
    pub size: u64,
    /// Modification time of the duplicate
    #[serde(rename = "Last Modified Date")]
    pub modified: String,
    /// Creation time of the duplicate
    #[serde(rename = "Creation Date")]
    pub created: String,
}

impl ReportRow {
    /// Build the report row for a pair.
    #[must_use]
    pub fn from_pair(pair: &DuplicatePair) -> Self {
        Self {
            duplicate: pair.duplicate.path.to_string_lossy().into_owned(),
            original: pair.original.path.to_string_lossy().into_owned(),
            size: pair.duplicate.size,
            modified: format_timestamp(pair.duplicate.modified),
            created: format_timestamp(pair.duplicate.created),
        }
    }
}

/// Format a file time as local `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format(TIMESTAMP_FORMAT).to_string()
}

/// Write `contents` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`. On failure the destination is untouched and
/// the temporary file is removed.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the temporary file cannot be created,
/// written or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let io_err = |source: std::io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
