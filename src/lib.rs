//! dupescan - duplicate file finder
//!
//! Finds duplicate files by grouping them by size and, optionally,
//! confirming each group with a BLAKE3 content hash. In every duplicate
//! set the earliest-created file is the original; every other member is
//! reported as a duplicate of it.
//!
//! The library exposes the detection pipeline ([`duplicates::DuplicateFinder`])
//! and the report writers ([`output`]); [`run_app`] wires them to the CLI.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use yansi::Paint;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{format_size, DuplicateFinder, DuplicatePair, ScanSummary};
use crate::error::ExitCode;
use crate::output::{write_atomic, CsvOutput, JsonOutput, OutputError, TextOutput};
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the root directory
/// is invalid, the pattern is malformed, or the scan is interrupted
/// (`FinderError::Interrupted`). A report that cannot be written is not an
/// error; it yields [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let mut finder_config = config
        .to_finder_config()
        .with_shutdown_flag(handler.get_flag());

    if !config.quiet {
        print_settings(&config, finder_config.indexer_config.min_size);
    }
    if !config.quiet && !config.no_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (pairs, summary) = finder
        .find_duplicates(&config.dir)
        .with_context(|| format!("Failed to scan {}", config.dir.display()))?;

    let mut all_reports_written = true;
    if pairs.is_empty() {
        if !config.quiet {
            println!("No duplicates found.");
        }
    } else {
        if !config.quiet {
            println!("\nFound {} duplicate files:", summary.duplicate_count);
            let stdout = std::io::stdout();
            TextOutput::new(&pairs)
                .write_annotated_to(stdout.lock())
                .context("Failed to print duplicates")?;
        }
        all_reports_written = write_reports(&config, &pairs);
    }

    print_summary(&summary);

    if all_reports_written {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}

fn print_settings(config: &Config, min_size: u64) {
    let root = std::path::absolute(&config.dir).unwrap_or_else(|_| config.dir.clone());
    println!("Searching for duplicates in {}", root.display().bold());
    println!("File pattern: {}", config.pattern);
    println!("Current folder only: {}", config.current_folder_only);
    println!("Checking file contents: {}", config.check_contents);
    println!("Minimum file size: {}", format_size(min_size));
    let keywords = config.exclude_keywords();
    if !keywords.is_empty() {
        println!("Excluding files with these keywords: {}", keywords.join(", "));
    }
}

/// Write every requested report. Returns false if any target failed.
fn write_reports(config: &Config, pairs: &[DuplicatePair]) -> bool {
    let mut ok = true;

    if let Some(ref path) = config.output {
        let text = TextOutput::new(pairs).render();
        ok &= report(path, "List of duplicates", config.quiet, || Ok(text.into_bytes()));
    }
    if let Some(ref path) = config.csv {
        ok &= report(path, "Detailed duplicate information", config.quiet, || {
            Ok(CsvOutput::new(pairs).to_string()?.into_bytes())
        });
    }
    if let Some(ref path) = config.json {
        ok &= report(path, "Detailed duplicate information", config.quiet, || {
            let mut buffer = Vec::new();
            JsonOutput::new(pairs).write_to(&mut buffer)?;
            Ok(buffer)
        });
    }

    ok
}

/// Render one report and write it atomically, logging any failure.
fn report(
    path: &Path,
    what: &str,
    quiet: bool,
    render: impl FnOnce() -> Result<Vec<u8>, OutputError>,
) -> bool {
    match render().and_then(|bytes| write_atomic(path, &bytes)) {
        Ok(()) => {
            if !quiet {
                println!("\n{} has been saved to {}", what, path.display());
            }
            true
        }
        Err(e) => {
            log::error!("Could not write {}: {}", path.display(), e);
            false
        }
    }
}

fn print_summary(summary: &ScanSummary) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "\n{}", "Summary Statistics:".bold());
    let _ = writeln!(out, "Total files checked: {}", summary.total_files);
    let _ = writeln!(out, "Excluded files: {}", summary.excluded_files);
    if !summary.scan_errors.is_empty() {
        let _ = writeln!(
            out,
            "Files skipped due to errors: {}",
            summary.scan_errors.len().to_string().red()
        );
    }
    let dupes = summary.duplicate_count.to_string();
    let _ = writeln!(
        out,
        "Total duplicate files: {}",
        if summary.duplicate_count > 0 {
            dupes.yellow().bold()
        } else {
            dupes.green()
        }
    );
    let _ = writeln!(
        out,
        "Total size of duplicate files: {} ({:.1}% of all files)",
        summary.duplicate_size_display(),
        summary.duplicate_percentage()
    );
    let _ = writeln!(
        out,
        "Total size of all files: {}",
        summary.total_size_display()
    );
    let _ = writeln!(
        out,
        "Duration of duplicate check: {:.2}s",
        summary.scan_duration.as_secs_f64()
    );
}
