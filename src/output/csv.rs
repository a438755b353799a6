//! CSV output formatter for resolved duplicates.
//!
//! One row is generated for each duplicate file.
//!
//! # Columns
//!
//! - `Duplicate Filepath`: Absolute path to the duplicate
//! - `Original Filepath`: Absolute path to its original
//! - `Filesize (bytes)`: File size in bytes
//! - `Last Modified Date`: Duplicate's modification time (local)
//! - `Creation Date`: Duplicate's creation time (local)

use std::io;

use super::{OutputError, ReportRow};
use crate::duplicates::DuplicatePair;

/// CSV output formatter.
pub struct CsvOutput<'a> {
    pairs: &'a [DuplicatePair],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(pairs: &'a [DuplicatePair]) -> Self {
        Self { pairs }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), OutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for pair in self.pairs {
            csv_writer.serialize(ReportRow::from_pair(pair))?;
        }

        // serialize() only emits the header with the first row
        if self.pairs.is_empty() {
            csv_writer.write_record([
                "Duplicate Filepath",
                "Original Filepath",
                "Filesize (bytes)",
                "Last Modified Date",
                "Creation Date",
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, OutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
