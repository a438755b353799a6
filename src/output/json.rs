//! JSON output formatter for resolved duplicates.
//!
//! # Output Schema
//!
//! ```json
//! [
//!   {
//!     "Duplicate Filepath": "/photos/copy.jpg",
//!     "Original Filepath": "/photos/beach.jpg",
//!     "Filesize (bytes)": 1024,
//!     "Last Modified Date": "2024-05-01 12:30:00",
//!     "Creation Date": "2024-05-01 12:29:58"
//!   }
//! ]
//! ```

use std::io::Write;

use super::{OutputError, ReportRow};
use crate::duplicates::DuplicatePair;

/// JSON output formatter.
pub struct JsonOutput {
    rows: Vec<ReportRow>,
}

impl JsonOutput {
    /// Create a JSON formatter for the given pairs.
    #[must_use]
    pub fn new(pairs: &[DuplicatePair]) -> Self {
        Self {
            rows: pairs.iter().map(ReportRow::from_pair).collect(),
        }
    }

    /// Serialize to pretty-printed JSON (two-space indent).
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }

    /// Write pretty-printed JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), OutputError> {
        let json = self.to_json_pretty()?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }
}
