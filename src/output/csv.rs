//! CSV output formatter for duplicate scan results.
//!
//! Provides machine-readable CSV output for spreadsheets and data analysis.
//! One row is generated for each duplicate object.
//!
//! # Columns
//!
//! - `group_id`: Numeric ID identifying the duplicate group (1-based, map order)
//! - `hash`: Content hash / ETag as listed
//! - `key`: Object key
//! - `size`: Object size in bytes
//! - `last_modified`: Last modified time (RFC 3339 format)
//! - `storage_class`: Storage class, empty when not listed
//! - `common_prefix`: Derived prefix annotation, empty when none
//!
//! # Example
//!
//! ```no_run
//! use s3dups::duplicates::DuplicateFinder;
//! use s3dups::output::csv::CsvOutput;
//! use s3dups::source::ListingSource;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (analysis, _) = finder.find_duplicates(&ListingSource::new("listing.json")).unwrap();
//!
//! let output = CsvOutput::new(&analysis);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::Analysis;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    hash: &'a str,
    key: &'a str,
    size: u64,
    last_modified: String,
    storage_class: &'a str,
    common_prefix: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    analysis: &'a Analysis,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, (hash, members)) in self.analysis.duplicates.iter().enumerate() {
            for object in members {
                let common_prefix = self
                    .analysis
                    .clusters
                    .as_ref()
                    .and_then(|clusters| clusters.annotation(&object.key))
                    .unwrap_or_default();

                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    hash,
                    key: &object.key,
                    size: object.size,
                    last_modified: object.last_modified.to_rfc3339(),
                    storage_class: object.storage_class.as_deref().unwrap_or_default(),
                    common_prefix,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
