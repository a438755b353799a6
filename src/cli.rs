//! Command-line interface definitions for dupescan.
//!
//! This module defines all CLI arguments using the clap derive API, plus
//! the parsers for the human-readable size and keyword-list arguments.
//!
//! # Example
//!
//! ```bash
//! # Size-only scan of the current directory
//! dupescan
//!
//! # Confirm duplicates by content, only JPEGs over 1MB
//! dupescan -d ~/Pictures -p '*.jpg' --check-contents --min-filesize 1MB
//!
//! # Write reports
//! dupescan --check-contents --csv dupes.csv --json dupes.json -o dupes.txt
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find duplicate files by size, optionally confirmed by content hash.
///
/// Files of identical size are grouped together; with --check-contents each
/// group is split further by BLAKE3 digest. In every group the file with
/// the earliest creation time is kept as the original and the rest are
/// reported as duplicates.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search in [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// File name pattern (e.g. '*.jpg', 'img-*.png') [default: *]
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Search only the given directory, not its subdirectories
    #[arg(long)]
    pub current_folder_only: bool,

    /// Confirm duplicates by hashing file contents
    ///
    /// Without this flag files are compared by size only, so files of equal
    /// size but different content are reported as duplicates.
    #[arg(long)]
    pub check_contents: bool,

    /// Comma-separated keywords; files whose path contains any are skipped
    #[arg(long, value_name = "KEYWORDS")]
    pub exclude: Option<String>,

    /// Minimum file size to consider (e.g. 500B, 10MB, 1.5GB) [default: 0B]
    ///
    /// Units: B, KB, MB, GB, TB (powers of 1024). A bare number is bytes.
    #[arg(long, value_name = "SIZE")]
    pub min_filesize: Option<String>,

    /// Write the list of duplicate paths to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write detailed duplicate information as CSV
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Write detailed duplicate information as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Do not print individual matches (takes precedence over -v for logging)
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of threads used for hashing [default: available cores]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub io_threads: Option<u64>,

    /// Descend into symlinked directories
    ///
    /// Warning: May revisit files if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Configuration file (TOML)
    ///
    /// If not specified, a platform-specific default path is used when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Errors from [`parse_size`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeParseError {
    /// The numeric part is missing or not a non-negative decimal.
    #[error("Invalid size '{0}': expected a number such as 10, 1.5 or 0.25")]
    InvalidNumber(String),

    /// The unit is not one of B, KB, MB, GB, TB.
    #[error("Invalid size '{input}': unknown unit '{unit}' (use B, KB, MB, GB or TB)")]
    UnknownUnit {
        /// The full input
        input: String,
        /// The unrecognized unit
        unit: String,
    },
}

/// Parse a human-readable size string into bytes.
///
/// Grammar, after trimming and upper-casing: `NUMBER [WS] [UNIT]`, where
/// NUMBER is a non-negative decimal and UNIT is one of `B`, `KB`, `MB`,
/// `GB`, `TB` with binary multipliers. A bare number is bytes and an empty
/// string is zero.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_size;
///
/// assert_eq!(parse_size("500").unwrap(), 500);
/// assert_eq!(parse_size("0B").unwrap(), 0);
/// assert_eq!(parse_size("1KB").unwrap(), 1024);
/// assert_eq!(parse_size("1.5 mb").unwrap(), 1_572_864);
/// assert!(parse_size("10K").is_err());
/// ```
///
/// # Errors
///
/// Returns [`SizeParseError`] for a missing or malformed number or an
/// unknown unit.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let s = input.trim().to_uppercase();
    if s.is_empty() {
        return Ok(0);
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (num_str, unit) = s.split_at(split);
    let unit = unit.trim();

    if num_str.is_empty() {
        return Err(SizeParseError::InvalidNumber(input.to_string()));
    }
    let num: f64 = num_str
        .parse()
        .map_err(|_| SizeParseError::InvalidNumber(input.to_string()))?;

    let multiplier: u64 = match unit {
        "" | "B" => 1,
        "KB" => 1 << 10,
        "MB" => 1 << 20,
        "GB" => 1 << 30,
        "TB" => 1 << 40,
        _ => {
            return Err(SizeParseError::UnknownUnit {
                input: input.to_string(),
                unit: unit.to_string(),
            })
        }
    };

    Ok((num * multiplier as f64) as u64)
}

/// Split a comma-separated keyword list, dropping blank entries.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_exclude_keywords;
///
/// assert_eq!(parse_exclude_keywords(" backup, ,tmp "), vec!["backup", "tmp"]);
/// assert!(parse_exclude_keywords("").is_empty());
/// ```
#[must_use]
pub fn parse_exclude_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
