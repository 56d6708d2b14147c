//! Hash grouping and duplicate filtering.
//!
//! # Overview
//!
//! Grouping is the first phase of the pipeline. Every non-empty object is
//! placed in exactly one group selected by its content hash; zero-size objects
//! are set aside because every empty object shares the same hash. Filtering
//! then keeps only the groups with two or more members.
//!
//! Groups are held in an insertion-ordered map, so a group's position is the
//! arrival order of its first member and members keep arrival order.
//!
//! # Example
//!
//! ```
//! use s3dups::source::ObjectRecord;
//! use s3dups::duplicates::{filter_duplicates, group_by_hash};
//! use chrono::Utc;
//!
//! let records = vec![
//!     ObjectRecord::new("x/1.dat", "H1", 10, Utc::now()),
//!     ObjectRecord::new("x/2.dat", "H1", 10, Utc::now()),
//!     ObjectRecord::new("y/1.dat", "H2", 10, Utc::now()),
//! ];
//!
//! let grouping = group_by_hash(records).unwrap();
//! assert_eq!(grouping.groups.len(), 2);
//!
//! let duplicates = filter_duplicates(grouping.groups);
//! assert_eq!(duplicates.len(), 1);
//! assert_eq!(duplicates["H1"].len(), 2);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::finder::FinderError;
use crate::source::ObjectRecord;

/// Records grouped by content hash, in first-arrival order.
pub type HashGroups = IndexMap<String, Vec<ObjectRecord>>;

/// Output of [`group_by_hash`].
#[derive(Debug, Clone, Default)]
pub struct HashGrouping {
    /// Non-empty records grouped by content hash
    pub groups: HashGroups,
    /// Zero-size records, in arrival order, never grouped
    pub zero_size: Vec<ObjectRecord>,
    /// Statistics about the grouping
    pub stats: GroupingStats,
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    /// Total number of records processed
    pub total_objects: usize,
    /// Total size of all records in bytes
    pub total_size: u64,
    /// Number of zero-size records set aside
    pub zero_size_objects: usize,
    /// Number of distinct content hashes among non-empty records
    pub unique_hashes: usize,
}

impl GroupingStats {
    /// Number of records that entered a hash group.
    #[must_use]
    pub fn grouped_objects(&self) -> usize {
        self.total_objects - self.zero_size_objects
    }
}

/// A content hash shared by two or more objects, borrowed from [`HashGroups`].
///
/// Sizes are not cross-checked; the hash is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateGroup<'a> {
    /// The shared content hash
    pub content_hash: &'a str,
    /// Member records in arrival order
    pub objects: &'a [ObjectRecord],
}

impl<'a> DuplicateGroup<'a> {
    /// Create a duplicate group view.
    #[must_use]
    pub fn new(content_hash: &'a str, objects: &'a [ObjectRecord]) -> Self {
        Self {
            content_hash,
            objects,
        }
    }

    /// Number of objects in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Total size of all objects in this group, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.objects
            .iter()
            .fold(0u64, |total, o| total.saturating_add(o.size))
    }

    /// Total wasted space (all copies minus one), saturating at `u64::MAX`.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.objects
            .iter()
            .skip(1)
            .fold(0u64, |total, o| total.saturating_add(o.size))
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.objects.len().saturating_sub(1)
    }

    /// Keys of the objects in this group.
    #[must_use]
    pub fn keys(&self) -> Vec<&'a str> {
        self.objects.iter().map(|o| o.key.as_str()).collect()
    }
}

/// Reject records that cannot be grouped.
fn validate(record: &ObjectRecord) -> Result<(), FinderError> {
    if record.key.is_empty() {
        return Err(FinderError::InvalidRecord {
            key: record.key.clone(),
            reason: "empty key".to_string(),
        });
    }
    if record.content_hash.is_empty() {
        return Err(FinderError::InvalidRecord {
            key: record.key.clone(),
            reason: "missing content hash".to_string(),
        });
    }
    Ok(())
}

/// Group records by content hash.
///
/// Zero-size records are returned separately in
/// [`HashGrouping::zero_size`] and never enter a group.
///
/// # Errors
///
/// Returns [`FinderError::InvalidRecord`] for a record with an empty key or
/// content hash. Zero-size records are validated the same way.
///
/// # Performance
///
/// O(n) over the records; no I/O.
pub fn group_by_hash(
    records: impl IntoIterator<Item = ObjectRecord>,
) -> Result<HashGrouping, FinderError> {
    let mut grouping = HashGrouping::default();

    for record in records {
        validate(&record)?;
        grouping.stats.total_objects += 1;
        grouping.stats.total_size = grouping.stats.total_size.saturating_add(record.size);

        if record.is_empty() {
            log::debug!("Zero-size object set aside: {}", record.key);
            grouping.zero_size.push(record);
            continue;
        }

        grouping
            .groups
            .entry(record.content_hash.clone())
            .or_default()
            .push(record);
    }

    grouping.stats.zero_size_objects = grouping.zero_size.len();
    grouping.stats.unique_hashes = grouping.groups.len();

    if grouping.stats.zero_size_objects > 0 {
        log::warn!(
            "Set aside {} zero-size object(s) - they are not compared",
            grouping.stats.zero_size_objects
        );
    }

    log::info!(
        "Grouping complete: {} of {} objects → {} distinct hashes",
        grouping.stats.grouped_objects(),
        grouping.stats.total_objects,
        grouping.stats.unique_hashes
    );

    Ok(grouping)
}

/// Keep only groups with two or more members.
///
/// Map order and member order are preserved. Applying the filter to its own
/// output returns the same groups.
#[must_use]
pub fn filter_duplicates(groups: HashGroups) -> HashGroups {
    let before = groups.len();
    let filtered: HashGroups = groups
        .into_iter()
        .filter(|(hash, members)| {
            if members.len() > 1 {
                log::debug!("Hash {}: {} copies", hash, members.len());
                true
            } else {
                log::trace!("Eliminated unique hash {}", hash);
                false
            }
        })
        .collect();

    log::info!(
        "Filtering complete: {} of {} hashes have duplicates",
        filtered.len(),
        before
    );

    filtered
}

/// View duplicate groups as [`DuplicateGroup`] values, in map order.
pub fn to_duplicate_groups(groups: &HashGroups) -> impl Iterator<Item = DuplicateGroup<'_>> {
    groups
        .iter()
        .map(|(hash, objects)| DuplicateGroup::new(hash, objects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_object(key: &str, hash: &str, size: u64) -> ObjectRecord {
        ObjectRecord::new(key, hash, size, Utc::now())
    }

    #[test]
    fn test_group_by_hash_empty_input() {
        let grouping = group_by_hash(Vec::new()).unwrap();

        assert!(grouping.groups.is_empty());
        assert!(grouping.zero_size.is_empty());
        assert_eq!(grouping.stats, GroupingStats::default());
    }

    #[test]
    fn test_group_by_hash_preserves_arrival_order() {
        let records = vec![
            make_object("b/2", "H2", 5),
            make_object("a/1", "H1", 5),
            make_object("c/2", "H2", 5),
            make_object("d/1", "H1", 5),
        ];
        let grouping = group_by_hash(records).unwrap();

        let hashes: Vec<&String> = grouping.groups.keys().collect();
        assert_eq!(hashes, vec!["H2", "H1"]);
        let keys: Vec<&str> = grouping.groups["H2"].iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["b/2", "c/2"]);
        assert_eq!(grouping.stats.unique_hashes, 2);
        assert_eq!(grouping.stats.total_size, 20);
    }

    #[test]
    fn test_group_by_hash_zero_size_set_aside() {
        let records = vec![
            make_object("empty1", "E", 0),
            make_object("empty2", "E", 0),
            make_object("full", "H", 100),
        ];
        let grouping = group_by_hash(records).unwrap();

        assert_eq!(grouping.groups.len(), 1);
        assert!(!grouping.groups.contains_key("E"));
        assert_eq!(grouping.zero_size.len(), 2);
        assert_eq!(grouping.stats.total_objects, 3);
        assert_eq!(grouping.stats.zero_size_objects, 2);
        assert_eq!(grouping.stats.grouped_objects(), 1);
    }

    #[test]
    fn test_group_by_hash_rejects_missing_hash() {
        let records = vec![make_object("ok", "H", 1), make_object("bad", "", 1)];
        let err = group_by_hash(records).unwrap_err();

        match err {
            FinderError::InvalidRecord { key, reason } => {
                assert_eq!(key, "bad");
                assert!(reason.contains("content hash"));
            }
            other => panic!("Expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_group_by_hash_rejects_empty_key() {
        let err = group_by_hash(vec![make_object("", "H", 1)]).unwrap_err();
        assert!(matches!(err, FinderError::InvalidRecord { .. }));
    }

    #[test]
    fn test_filter_duplicates() {
        let records = vec![
            make_object("a", "H1", 1),
            make_object("b", "H1", 1),
            make_object("c", "H2", 1),
            make_object("d", "H3", 1),
            make_object("e", "H3", 1),
            make_object("f", "H3", 1),
        ];
        let grouping = group_by_hash(records).unwrap();
        let duplicates = filter_duplicates(grouping.groups);

        let hashes: Vec<&String> = duplicates.keys().collect();
        assert_eq!(hashes, vec!["H1", "H3"]);
        assert_eq!(duplicates["H3"].len(), 3);
    }

    #[test]
    fn test_filter_duplicates_idempotent() {
        let records = vec![
            make_object("a", "H1", 1),
            make_object("b", "H1", 1),
            make_object("c", "H2", 1),
        ];
        let grouping = group_by_hash(records).unwrap();
        let once = filter_duplicates(grouping.groups);
        let twice = filter_duplicates(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_group_wasted_space() {
        let objects = vec![
            make_object("/a", "H", 1000),
            make_object("/b", "H", 1000),
            make_object("/c", "H", 1000),
        ];
        let group = DuplicateGroup::new("H", &objects);

        assert_eq!(group.total_size(), 3000);
        assert_eq!(group.wasted_space(), 2000);
        assert_eq!(group.duplicate_count(), 2);
        assert_eq!(group.keys(), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_duplicate_group_single_object() {
        let objects = vec![make_object("/a", "H", 1000)];
        let group = DuplicateGroup::new("H", &objects);

        assert_eq!(group.wasted_space(), 0);
        assert_eq!(group.duplicate_count(), 0);
    }

    #[test]
    fn test_to_duplicate_groups_order() {
        let mut groups = HashGroups::new();
        groups.insert("Z".to_string(), vec![make_object("1", "Z", 1)]);
        groups.insert("A".to_string(), vec![make_object("2", "A", 1)]);

        let view: Vec<DuplicateGroup<'_>> = to_duplicate_groups(&groups).collect();
        assert_eq!(view[0].content_hash, "Z");
        assert_eq!(view[1].content_hash, "A");
        // Views borrow the map's records
        assert!(std::ptr::eq(view[0].objects, groups["Z"].as_slice()));
    }

    #[test]
    fn test_huge_sizes_saturate() {
        let records = vec![
            make_object("a", "H", u64::MAX),
            make_object("b", "H", u64::MAX),
            make_object("c", "H", u64::MAX),
        ];
        let grouping = group_by_hash(records).unwrap();
        assert_eq!(grouping.stats.total_size, u64::MAX);

        let group = DuplicateGroup::new("H", &grouping.groups["H"]);
        assert_eq!(group.total_size(), u64::MAX);
        assert_eq!(group.wasted_space(), u64::MAX);
        assert_eq!(group.duplicate_count(), 2);
    }

    #[test]
    fn test_large_object_count_performance() {
        use std::time::Instant;

        let records: Vec<ObjectRecord> = (0..100_000)
            .map(|i| {
                let hash = if i % 2 == 0 {
                    format!("u{i}")
                } else {
                    format!("d{}", i / 100)
                };
                make_object(&format!("data/file{i}.bin"), &hash, 10)
            })
            .collect();

        let start = Instant::now();
        let grouping = group_by_hash(records).unwrap();
        let duplicates = filter_duplicates(grouping.groups);
        let elapsed = start.elapsed();

        assert_eq!(grouping.stats.total_objects, 100_000);
        assert!(!duplicates.is_empty());
        assert!(
            elapsed.as_secs() < 2,
            "Grouping took too long: {:?}",
            elapsed
        );
    }
}
