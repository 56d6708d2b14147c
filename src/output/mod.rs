//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text for reading in a terminal (per-hash listing or duplicate sets)
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use s3dups::duplicates::DuplicateFinder;
//! use s3dups::error::ExitCode;
//! use s3dups::output::json::JsonOutput;
//! use s3dups::source::ListingSource;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (analysis, summary) = finder.find_duplicates(&ListingSource::new("listing.json")).unwrap();
//!
//! let output = JsonOutput::new(&analysis, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
