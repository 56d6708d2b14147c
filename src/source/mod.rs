//! Object record sources.
//!
//! This module provides the records the duplicate pipeline consumes:
//! - [`ObjectRecord`]: metadata for one stored object (key, content hash, size, mtime)
//! - [`ObjectSource`]: a paginated producer of records
//! - [`listing`]: a source backed by `aws s3api list-objects-v2` JSON output
//! - [`MemorySource`]: an in-memory source for embedding and tests
//!
//! # Example
//!
//! ```
//! use s3dups::source::{MemorySource, ObjectRecord, ObjectSource};
//! use chrono::Utc;
//!
//! let source = MemorySource::new(vec![
//!     ObjectRecord::new("photos/a.jpg", "\"etag-1\"", 1024, Utc::now()),
//!     ObjectRecord::new("backup/a.jpg", "\"etag-1\"", 1024, Utc::now()),
//! ]);
//!
//! let mut total = 0;
//! for page in source.pages() {
//!     total += page.unwrap().len();
//! }
//! assert_eq!(total, 2);
//! ```

pub mod listing;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use listing::ListingSource;

/// Metadata for a single stored object.
///
/// Records are immutable once produced by a source. The pipeline shares them
/// read-only between groups and clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Full object key
    pub key: String,
    /// Opaque content equality key (usually the ETag), trusted as-is
    pub content_hash: String,
    /// Object size in bytes
    pub size: u64,
    /// Last modification time
    pub last_modified: DateTime<Utc>,
    /// Storage class reported by the listing, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectRecord {
    /// Create a new record.
    ///
    /// # Arguments
    ///
    /// * `key` - Object key
    /// * `content_hash` - Content hash / ETag
    /// * `size` - Size in bytes
    /// * `last_modified` - Last modification time
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        content_hash: impl Into<String>,
        size: u64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            content_hash: content_hash.into(),
            size,
            last_modified,
            storage_class: None,
        }
    }

    /// Attach a storage class.
    #[must_use]
    pub fn with_storage_class(mut self, class: impl Into<String>) -> Self {
        self.storage_class = Some(class.into());
        self
    }

    /// Whether this object has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// One page of records as delivered by a source.
pub type RecordPage = Vec<ObjectRecord>;

/// A producer of object records, possibly split across pages.
///
/// Pages are consumed in order from a single thread. A source that fetches
/// pages concurrently must still yield them through this iterator.
pub trait ObjectSource {
    /// Human-readable description of where the records come from.
    fn describe(&self) -> String;

    /// Iterate over record pages.
    ///
    /// An `Err` item aborts the scan; the pipeline never retries.
    fn pages(&self) -> Box<dyn Iterator<Item = Result<RecordPage, SourceError>> + '_>;
}

/// Records held in memory, delivered as one or more pages.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<RecordPage>,
}

impl MemorySource {
    /// Create a source that yields all records in a single page.
    #[must_use]
    pub fn new(records: Vec<ObjectRecord>) -> Self {
        Self {
            pages: vec![records],
        }
    }

    /// Create a source that yields the given pages in order.
    #[must_use]
    pub fn with_pages(pages: Vec<RecordPage>) -> Self {
        Self { pages }
    }

    /// Total number of records across all pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    /// Check if the source holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} pages)", self.pages.len())
    }

    fn pages(&self) -> Box<dyn Iterator<Item = Result<RecordPage, SourceError>> + '_> {
        Box::new(self.pages.iter().cloned().map(Ok::<RecordPage, SourceError>))
    }
}

/// Errors raised while reading object records.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The listing could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The listing was not valid list-objects JSON.
    #[error("Invalid listing in {origin}: {source}")]
    Parse {
        /// Where the listing came from
        origin: String,
        /// The underlying JSON error (carries line and column)
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused or failed the request.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
