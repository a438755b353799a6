//! Plain-text output.
//!
//! The report file holds one duplicate path per line. The console listing
//! additionally names the original in parentheses:
//!
//! ```text
//! /photos/2021/copy of beach.jpg (/photos/2021/beach.jpg)
//! ```

use std::io::{self, Write};

use crate::duplicates::DuplicatePair;

/// Plain-text formatter.
pub struct TextOutput<'a> {
    pairs: &'a [DuplicatePair],
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(pairs: &'a [DuplicatePair]) -> Self {
        Self { pairs }
    }

    /// Write one duplicate path per line.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for pair in self.pairs {
            writeln!(writer, "{}", pair.duplicate.path.display())?;
        }
        writer.flush()
    }

    /// Write each duplicate followed by its original in parentheses.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_annotated_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for pair in self.pairs {
            writeln!(
                writer,
                "{} ({})",
                pair.duplicate.path.display(),
                pair.original.path.display()
            )?;
        }
        writer.flush()
    }

    /// Render the plain duplicate list as a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
