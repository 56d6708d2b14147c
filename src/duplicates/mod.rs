//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Content-hash grouping and duplicate filtering
//! - Longest-common-substring matching between keys
//! - Prefix clustering of copied key hierarchies
//! - Pipeline orchestration and scan statistics

pub mod clusters;
pub mod finder;
pub mod groups;
pub mod lcs;

pub use clusters::{
    cluster_by_prefix, derive_prefix, ClusterSet, CrossLink, PrefixCluster, DEFAULT_DELIMITER,
};
pub use finder::{
    Analysis, DuplicateFinder, FinderConfig, FinderError, IgnoreZeroSize, ScanSummary,
    ZeroSizeHandler,
};
pub use groups::{
    filter_duplicates, group_by_hash, to_duplicate_groups, DuplicateGroup, GroupingStats,
    HashGroups, HashGrouping,
};
pub use lcs::{longest_common_substring, CommonSubstring};
