//! Prefix clustering of duplicate keys.
//!
//! # Overview
//!
//! Object stores have no real directories, so copied hierarchies are inferred
//! from key strings:
//!
//! 1. Every duplicate key is collected and sorted lexicographically.
//! 2. Each key is aligned with its sorted neighbour only, using the longest
//!    common substring.
//! 3. The match is cut back to its last delimiter; the part on the left is the
//!    *derived prefix*. A derived prefix without a delimiter is discarded.
//! 4. Both keys of an accepted pair join the cluster for that prefix, and the
//!    left key of the pair is annotated with it.
//! 5. For each cluster, the annotations of its members' siblings (same content
//!    hash, different key) are counted into ranked cross-link statistics.
//!
//! Only the left key of each pair is annotated. A key sits at exactly one
//! sorted position, so it carries at most one annotation and a sibling is never
//! counted twice for the same pair.
//!
//! Neighbour-only alignment is an approximation: an unrelated key sorting
//! between two copies hides the pair, and neighbours from unrelated hash groups
//! are still compared.
//!
//! # Example
//!
//! ```
//! use s3dups::source::ObjectRecord;
//! use s3dups::duplicates::{cluster_by_prefix, filter_duplicates, group_by_hash};
//! use chrono::Utc;
//!
//! let records = vec![
//!     ObjectRecord::new("data/x/1.dat", "H1", 10, Utc::now()),
//!     ObjectRecord::new("data/x/2.dat", "H1", 10, Utc::now()),
//! ];
//! let duplicates = filter_duplicates(group_by_hash(records).unwrap().groups);
//!
//! let clusters = cluster_by_prefix(&duplicates, "/", None);
//! assert_eq!(clusters.len(), 1);
//! assert!(clusters.get("data/x").is_some());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::groups::HashGroups;
use super::lcs::longest_common_substring;
use crate::progress::ProgressCallback;
use crate::source::ObjectRecord;

/// Default key path delimiter.
pub const DEFAULT_DELIMITER: &str = "/";

/// How often another cluster's prefix shows up among a cluster's siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossLink {
    /// The sibling's derived prefix
    pub prefix: String,
    /// Number of siblings carrying that prefix
    pub count: usize,
}

/// A set of duplicate keys sharing one derived prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixCluster {
    /// The derived prefix identifying this cluster
    pub prefix: String,
    /// Member keys, sorted
    pub keys: BTreeSet<String>,
    /// Member records, in key order
    pub objects: Vec<ObjectRecord>,
    /// Cross-link statistics, highest count first
    pub cross_links: Vec<CrossLink>,
    /// For each member key, its siblings in the same duplicate group
    pub linked: BTreeMap<String, Vec<ObjectRecord>>,
}

impl PrefixCluster {
    /// Number of member keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the cluster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total size of the member objects, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.objects
            .iter()
            .fold(0u64, |total, o| total.saturating_add(o.size))
    }

    /// Number of annotated siblings counted in the cross-link statistics.
    #[must_use]
    pub fn cross_link_total(&self) -> usize {
        self.cross_links.iter().map(|l| l.count).sum()
    }
}

/// Result of [`cluster_by_prefix`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSet {
    /// Clusters in order of first creation
    pub clusters: IndexMap<String, PrefixCluster>,
    /// Derived-prefix annotation per key (left element of each accepted pair)
    pub annotations: BTreeMap<String, String>,
    /// Number of adjacent pairs aligned
    pub pairs_compared: usize,
    /// Number of pairs whose derived prefix was accepted
    pub pairs_accepted: usize,
}

impl ClusterSet {
    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Check if no cluster was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Look up a cluster by prefix.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&PrefixCluster> {
        self.clusters.get(prefix)
    }

    /// Iterate over clusters in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &PrefixCluster> {
        self.clusters.values()
    }

    /// The annotation of a key, if it was the left element of an accepted pair.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// Cut a matched substring back to its last delimiter.
///
/// The match is split once from the right and the left part kept; a match
/// without the delimiter is kept whole. The result is accepted only if it still
/// contains the delimiter.
///
/// # Example
///
/// ```
/// use s3dups::duplicates::derive_prefix;
///
/// assert_eq!(derive_prefix("a/b/file", "/"), Some("a/b"));
/// assert_eq!(derive_prefix("x/", "/"), None);
/// assert_eq!(derive_prefix(".dat", "/"), None);
/// ```
#[must_use]
pub fn derive_prefix<'a>(matched: &'a str, delimiter: &str) -> Option<&'a str> {
    if delimiter.is_empty() {
        return None;
    }
    let prefix = matched
        .rsplit_once(delimiter)
        .map_or(matched, |(left, _)| left);
    prefix.contains(delimiter).then_some(prefix)
}

/// Derived prefix shared by two neighbouring keys, if any.
fn neighbour_prefix(left: &str, right: &str, delimiter: &str) -> Option<String> {
    let matched = longest_common_substring(left, right)?;
    let prefix = derive_prefix(matched.text, delimiter);
    log::trace!(
        "Aligned {:?} / {:?}: match {:?} → {:?}",
        left,
        right,
        matched.text,
        prefix
    );
    prefix.map(str::to_string)
}

/// Cluster duplicate keys by derived prefix.
///
/// # Arguments
///
/// * `duplicates` - Duplicate groups (normally the output of
///   [`super::filter_duplicates`])
/// * `delimiter` - Key path delimiter; an empty delimiter yields no clusters
/// * `progress` - Optional progress callback, ticked once per aligned pair
///
/// # Determinism
///
/// The output depends only on the set of keys and the order of members
/// within each group. Pair alignments run in parallel but are applied in
/// sorted order.
#[must_use]
pub fn cluster_by_prefix(
    duplicates: &HashGroups,
    delimiter: &str,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> ClusterSet {
    let mut key_to_object: HashMap<&str, &ObjectRecord> = HashMap::new();
    let mut keys: Vec<&str> = Vec::new();
    for members in duplicates.values() {
        for object in members {
            keys.push(object.key.as_str());
            key_to_object.insert(object.key.as_str(), object);
        }
    }
    keys.sort_unstable();

    if keys.len() < 2 || delimiter.is_empty() {
        log::debug!("Clustering skipped: {} duplicate key(s)", keys.len());
        return ClusterSet::default();
    }

    let pair_count = keys.len() - 1;
    if let Some(callback) = progress {
        callback.on_phase_start("clustering", pair_count);
    }

    let derived: Vec<Option<String>> = keys
        .par_windows(2)
        .enumerate()
        .map(|(idx, pair)| {
            if let Some(callback) = progress {
                callback.on_progress(idx + 1, pair[0]);
            }
            neighbour_prefix(pair[0], pair[1], delimiter)
        })
        .collect();

    let mut members: IndexMap<String, BTreeSet<&str>> = IndexMap::new();
    let mut annotations: HashMap<&str, String> = HashMap::new();
    let mut pairs_accepted = 0;

    for (idx, prefix) in derived.into_iter().enumerate() {
        let Some(prefix) = prefix else {
            continue;
        };
        let (left, right) = (keys[idx], keys[idx + 1]);
        pairs_accepted += 1;

        let entry = members.entry(prefix.clone()).or_default();
        entry.insert(left);
        entry.insert(right);
        annotations.insert(left, prefix);
    }

    let clusters: IndexMap<String, PrefixCluster> = members
        .into_iter()
        .map(|(prefix, cluster_keys)| {
            let cluster =
                build_cluster(&prefix, &cluster_keys, duplicates, &key_to_object, &annotations);
            (prefix, cluster)
        })
        .collect();

    if let Some(callback) = progress {
        callback.on_phase_end("clustering");
    }

    log::info!(
        "Clustering complete: {} pairs aligned, {} accepted, {} clusters",
        pair_count,
        pairs_accepted,
        clusters.len()
    );

    ClusterSet {
        clusters,
        annotations: annotations
            .into_iter()
            .map(|(key, prefix)| (key.to_string(), prefix))
            .collect(),
        pairs_compared: pair_count,
        pairs_accepted,
    }
}

/// Assemble one cluster and its cross-link statistics.
fn build_cluster(
    prefix: &str,
    cluster_keys: &BTreeSet<&str>,
    duplicates: &HashGroups,
    key_to_object: &HashMap<&str, &ObjectRecord>,
    annotations: &HashMap<&str, String>,
) -> PrefixCluster {
    let mut objects = Vec::with_capacity(cluster_keys.len());
    let mut linked = BTreeMap::new();
    // IndexMap keeps first-seen order for the stable tie-break below
    let mut counts: IndexMap<&str, usize> = IndexMap::new();

    for &key in cluster_keys {
        let Some(&object) = key_to_object.get(key) else {
            continue;
        };
        objects.push(object.clone());

        let siblings: Vec<ObjectRecord> = duplicates
            .get(&object.content_hash)
            .into_iter()
            .flatten()
            .filter(|sibling| sibling.key != object.key)
            .cloned()
            .collect();

        for sibling in &siblings {
            if let Some(sibling_prefix) = annotations.get(sibling.key.as_str()) {
                *counts.entry(sibling_prefix.as_str()).or_insert(0) += 1;
            }
        }

        linked.insert(key.to_string(), siblings);
    }

    let mut cross_links: Vec<CrossLink> = counts
        .into_iter()
        .map(|(prefix, count)| CrossLink {
            prefix: prefix.to_string(),
            count,
        })
        .collect();
    cross_links.sort_by(|a, b| b.count.cmp(&a.count));

    log::debug!(
        "Cluster {:?}: {} keys, {} cross-link prefixes",
        prefix,
        cluster_keys.len(),
        cross_links.len()
    );

    PrefixCluster {
        prefix: prefix.to_string(),
        keys: cluster_keys.iter().map(|k| k.to_string()).collect(),
        objects,
        cross_links,
        linked,
    }
}
