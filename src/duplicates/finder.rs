//! Duplicate finder orchestrating the detection pipeline.
//!
//! # Overview
//!
//! 1. **Listing**: Consume every page of the object source
//! 2. **Grouping**: Group non-empty objects by content hash (see [`crate::duplicates::groups`])
//! 3. **Filtering**: Keep hashes shared by two or more objects
//! 4. **Clustering**: Infer copied key hierarchies (see [`crate::duplicates::clusters`])
//!
//! The source is drained completely before grouping starts; a failing page
//! aborts the scan with [`FinderError::SourceUnavailable`].
//!
//! # Example
//!
//! ```
//! use s3dups::duplicates::{DuplicateFinder, FinderConfig};
//! use s3dups::source::{MemorySource, ObjectRecord};
//! use chrono::Utc;
//!
//! let source = MemorySource::new(vec![
//!     ObjectRecord::new("site/v1/logo.png", "E1", 2048, Utc::now()),
//!     ObjectRecord::new("site/v1/logo2.png", "E1", 2048, Utc::now()),
//! ]);
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (analysis, summary) = finder.find_duplicates(&source).unwrap();
//!
//! assert_eq!(summary.duplicate_groups, 1);
//! assert_eq!(summary.reclaimable_space, 2048);
//! assert!(analysis.clusters.unwrap().get("site/v1").is_some());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use serde::{Deserialize, Serialize};

use super::clusters::{cluster_by_prefix, ClusterSet, DEFAULT_DELIMITER};
use super::groups::{filter_duplicates, group_by_hash, to_duplicate_groups, HashGroups};
use crate::progress::ProgressCallback;
use crate::source::{ObjectRecord, ObjectSource, SourceError};

/// Hook receiving the zero-size objects of a scan.
///
/// Zero-size objects all share one hash and are never compared. The default
/// handler does nothing with them; implement this trait to act on them.
pub trait ZeroSizeHandler: Send + Sync {
    /// Called once per scan with every zero-size object, in arrival order.
    fn handle(&self, objects: &[ObjectRecord]);
}

/// Handler that only logs the number of zero-size objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreZeroSize;

impl ZeroSizeHandler for IgnoreZeroSize {
    fn handle(&self, objects: &[ObjectRecord]) {
        log::debug!("{} zero-size object(s) left unanalysed", objects.len());
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Key path delimiter used for clustering.
    pub delimiter: String,
    /// Skip clustering and report hash groups only.
    pub simple: bool,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Receiver for zero-size objects.
    pub zero_size_handler: Arc<dyn ZeroSizeHandler>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("delimiter", &self.delimiter)
            .field("simple", &self.simple)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("zero_size_handler", &"<handler>")
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            simple: false,
            progress_callback: None,
            zero_size_handler: Arc::new(IgnoreZeroSize),
        }
    }
}

impl FinderConfig {
    /// Set the key path delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Skip clustering.
    #[must_use]
    pub fn with_simple(mut self, simple: bool) -> Self {
        self.simple = simple;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the zero-size handler.
    #[must_use]
    pub fn with_zero_size_handler(mut self, handler: Arc<dyn ZeroSizeHandler>) -> Self {
        self.zero_size_handler = handler;
        self
    }
}

/// Everything a scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Hashes shared by two or more objects, in first-arrival order
    pub duplicates: HashGroups,
    /// Prefix clusters; `None` when clustering was skipped
    pub clusters: Option<ClusterSet>,
    /// Zero-size objects, never grouped
    pub zero_size: Vec<ObjectRecord>,
}

impl Analysis {
    /// Whether any duplicate was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Number of prefix clusters (zero when clustering was skipped).
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.as_ref().map_or(0, ClusterSet::len)
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Total number of objects listed
    pub total_objects: usize,
    /// Total size of all listed objects in bytes
    pub total_size: u64,
    /// Number of pages read from the source
    pub pages: usize,
    /// Number of zero-size objects set aside
    pub zero_size_objects: usize,
    /// Number of hashes shared by two or more objects
    pub duplicate_groups: usize,
    /// Number of duplicate objects (excluding one original per group)
    pub duplicate_objects: usize,
    /// Total space that could be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Number of prefix clusters
    pub clusters: usize,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Duration of the listing phase
    pub listing_duration: Duration,
    /// Duration of grouping and filtering
    pub grouping_duration: Duration,
    /// Duration of the clustering phase
    pub clustering_duration: Duration,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A record broke the input contract (e.g. missing content hash).
    #[error("Invalid record {key:?}: {reason}")]
    InvalidRecord {
        /// Key of the offending record
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// The object source failed before grouping could start.
    #[error("Object source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// The configured delimiter is empty.
    #[error("Delimiter must not be empty")]
    InvalidDelimiter,
}

/// Duplicate finder that runs the listing → grouping → clustering pipeline.
///
/// # Example
///
/// ```no_run
/// use s3dups::duplicates::{DuplicateFinder, FinderConfig};
/// use s3dups::source::ListingSource;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_delimiter("/"));
/// let source = ListingSource::new("listing.json");
///
/// let (analysis, summary) = finder.find_duplicates(&source).unwrap();
/// println!("Found {} duplicate groups", summary.duplicate_groups);
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicates among every object of `source`.
    ///
    /// # Errors
    ///
    /// - [`FinderError::InvalidDelimiter`] if the delimiter is empty
    /// - [`FinderError::SourceUnavailable`] if any page fails
    /// - [`FinderError::InvalidRecord`] if a record has no key or hash
    pub fn find_duplicates(
        &self,
        source: &dyn ObjectSource,
    ) -> Result<(Analysis, ScanSummary), FinderError> {
        let start_time = Instant::now();
        self.check_delimiter()?;

        log::info!("Listing objects from {}", source.describe());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("listing", 0);
            callback.on_message(&format!("Listing {}", source.describe()));
        }

        let mut records = Vec::new();
        let mut pages = 0;
        for page in source.pages() {
            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_phase_end("listing");
                    }
                    log::error!("Listing failed after {} page(s): {}", pages, e);
                    return Err(FinderError::SourceUnavailable(e));
                }
            };
            pages += 1;
            records.extend(page);
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(records.len(), &format!("page {pages}"));
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("listing");
        }
        let listing_duration = start_time.elapsed();
        log::info!(
            "Listed {} objects in {} page(s) ({:?})",
            records.len(),
            pages,
            listing_duration
        );

        let (analysis, mut summary) = self.analyze_records(records)?;
        summary.pages = pages;
        summary.listing_duration = listing_duration;
        summary.scan_duration = start_time.elapsed();

        Ok((analysis, summary))
    }

    /// Run grouping, filtering and clustering over already-listed records.
    ///
    /// # Errors
    ///
    /// - [`FinderError::InvalidDelimiter`] if the delimiter is empty
    /// - [`FinderError::InvalidRecord`] if a record has no key or hash
    pub fn analyze_records(
        &self,
        records: Vec<ObjectRecord>,
    ) -> Result<(Analysis, ScanSummary), FinderError> {
        let start_time = Instant::now();
        self.check_delimiter()?;

        let grouping = group_by_hash(records)?;
        let stats = grouping.stats;
        let duplicates = filter_duplicates(grouping.groups);
        let grouping_duration = start_time.elapsed();

        self.config.zero_size_handler.handle(&grouping.zero_size);

        let cluster_start = Instant::now();
        let clusters = if self.config.simple {
            log::debug!("Simple mode: clustering skipped");
            None
        } else {
            Some(cluster_by_prefix(
                &duplicates,
                &self.config.delimiter,
                self.config.progress_callback.as_ref(),
            ))
        };
        let clustering_duration = cluster_start.elapsed();

        let mut summary = ScanSummary {
            total_objects: stats.total_objects,
            total_size: stats.total_size,
            zero_size_objects: stats.zero_size_objects,
            duplicate_groups: duplicates.len(),
            grouping_duration,
            clustering_duration,
            ..Default::default()
        };
        for group in to_duplicate_groups(&duplicates) {
            summary.duplicate_objects += group.duplicate_count();
            summary.reclaimable_space = summary
                .reclaimable_space
                .saturating_add(group.wasted_space());
        }

        let analysis = Analysis {
            duplicates,
            clusters,
            zero_size: grouping.zero_size,
        };
        summary.clusters = analysis.cluster_count();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate objects, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_objects,
            summary.reclaimable_display()
        );

        Ok((analysis, summary))
    }

    fn check_delimiter(&self) -> Result<(), FinderError> {
        if self.config.delimiter.is_empty() {
            return Err(FinderError::InvalidDelimiter);
        }
        Ok(())
    }
}
