//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation. The
//! same document is written by `--file`.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": {
//!     "\"etag\"": [
//!       {"key": "a/b/1.txt", "content_hash": "\"etag\"", "size": 5, "last_modified": "..."}
//!     ]
//!   },
//!   "sets": {
//!     "a/b": {
//!       "statistics": [{"prefix": "c/b", "count": 2}],
//!       "keys": ["a/b/1.txt", "a/b/2.txt"],
//!       "objects": [...],
//!       "duplicates": {"a/b/1.txt": [...]}
//!     }
//!   },
//!   "zero_size": [...],
//!   "summary": {
//!     "total_objects": 100,
//!     "duplicate_groups": 5,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "SD000"
//!   }
//! }
//! ```
//!
//! `sets` is `null` when clustering was skipped.
//!
//! # Example
//!
//! ```no_run
//! use s3dups::duplicates::DuplicateFinder;
//! use s3dups::output::json::JsonOutput;
//! use s3dups::error::ExitCode;
//! use s3dups::source::ListingSource;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (analysis, summary) = finder.find_duplicates(&ListingSource::new("listing.json")).unwrap();
//!
//! let output = JsonOutput::new(&analysis, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;

use crate::duplicates::{Analysis, CrossLink, PrefixCluster, ScanSummary};
use crate::error::ExitCode;
use crate::source::ObjectRecord;

/// One duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSet {
    /// Cross-link statistics, highest count first
    pub statistics: Vec<CrossLink>,
    /// Member keys, sorted
    pub keys: BTreeSet<String>,
    /// Member records, in key order
    pub objects: Vec<ObjectRecord>,
    /// Siblings of each member key in its duplicate group
    pub duplicates: BTreeMap<String, Vec<ObjectRecord>>,
}

impl JsonSet {
    /// Create a JSON set from a prefix cluster.
    #[must_use]
    pub fn from_cluster(cluster: &PrefixCluster) -> Self {
        Self {
            statistics: cluster.cross_links.clone(),
            keys: cluster.keys.clone(),
            objects: cluster.objects.clone(),
            duplicates: cluster.linked.clone(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of objects listed
    pub total_objects: usize,
    /// Total size of all listed objects in bytes
    pub total_size: u64,
    /// Number of listing pages read
    pub pages: usize,
    /// Number of zero-size objects set aside
    pub zero_size_objects: usize,
    /// Number of hashes shared by two or more objects
    pub duplicate_groups: usize,
    /// Total number of duplicate objects (excluding originals)
    pub duplicate_objects: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Number of duplicate sets
    pub sets: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Duration of the listing phase in milliseconds
    pub listing_duration_ms: u64,
    /// Duration of grouping and filtering in milliseconds
    pub grouping_duration_ms: u64,
    /// Duration of the clustering phase in milliseconds
    pub clustering_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "SD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_objects: summary.total_objects,
            total_size: summary.total_size,
            pages: summary.pages,
            zero_size_objects: summary.zero_size_objects,
            duplicate_groups: summary.duplicate_groups,
            duplicate_objects: summary.duplicate_objects,
            reclaimable_space: summary.reclaimable_space,
            sets: summary.clusters,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            listing_duration_ms: summary.listing_duration.as_millis() as u64,
            grouping_duration_ms: summary.grouping_duration.as_millis() as u64,
            clustering_duration_ms: summary.clustering_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups keyed by content hash
    pub duplicates: IndexMap<String, Vec<ObjectRecord>>,
    /// Duplicate sets keyed by prefix, `None` in simple mode
    pub sets: Option<IndexMap<String, JsonSet>>,
    /// Zero-size objects
    pub zero_size: Vec<ObjectRecord>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from an analysis, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use s3dups::duplicates::{Analysis, ScanSummary};
    /// use s3dups::output::json::JsonOutput;
    /// use s3dups::error::ExitCode;
    ///
    /// let output = JsonOutput::new(&Analysis::default(), &ScanSummary::default(), ExitCode::NoDuplicates);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(analysis: &Analysis, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: analysis.duplicates.clone(),
            sets: analysis.clusters.as_ref().map(|clusters| {
                clusters
                    .iter()
                    .map(|c| (c.prefix.clone(), JsonSet::from_cluster(c)))
                    .collect()
            }),
            zero_size: analysis.zero_size.clone(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
