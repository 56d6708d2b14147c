use s3dups::duplicates::{DuplicateFinder, FinderError};
use s3dups::source::{ListingSource, ObjectSource, SourceError};
use std::fs;
use tempfile::tempdir;

const PAGES: &str = r#"[
  {
    "Contents": [
      {"Key": "media/2023/a.jpg", "ETag": "\"e1\"", "Size": 1000, "LastModified": "2023-03-01T10:00:00.000Z", "StorageClass": "STANDARD"},
      {"Key": "media/2023/b.jpg", "ETag": "\"e2\"", "Size": 2000, "LastModified": "2023-03-01T10:00:00.000Z", "StorageClass": "STANDARD"},
      {"Key": "other/readme.txt", "ETag": "\"e3\"", "Size": 10, "LastModified": "2023-03-01T10:00:00.000Z", "StorageClass": "STANDARD"}
    ],
    "IsTruncated": true,
    "NextContinuationToken": "abc"
  },
  {
    "Contents": [
      {"Key": "media/copy/2023/a.jpg", "ETag": "\"e1\"", "Size": 1000, "LastModified": "2023-04-01T10:00:00.000Z", "StorageClass": "STANDARD"},
      {"Key": "media/copy/2023/b.jpg", "ETag": "\"e2\"", "Size": 2000, "LastModified": "2023-04-01T10:00:00.000Z", "StorageClass": "STANDARD"},
      {"Key": "media/copy/empty", "ETag": "\"d41d8cd98f00b204e9800998ecf8427e\"", "Size": 0, "LastModified": "2023-04-01T10:00:00.000Z"}
    ],
    "IsTruncated": false
  }
]"#;

#[test]
fn test_scan_listing_file_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("listing.json");
    fs::write(&path, PAGES).unwrap();

    let source = ListingSource::new(&path);
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.total_objects, 6);
    assert_eq!(summary.zero_size_objects, 1);
    assert_eq!(summary.duplicate_groups, 2);
    assert_eq!(summary.reclaimable_space, 3000);

    let hashes: Vec<&String> = analysis.duplicates.keys().collect();
    assert_eq!(hashes, vec!["\"e1\"", "\"e2\""]);

    let clusters = analysis.clusters.unwrap();
    assert!(clusters.get("media/copy/2023").is_some());
}

#[test]
fn test_prefix_filter_limits_scan() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("listing.json");
    fs::write(&path, PAGES).unwrap();

    let source = ListingSource::new(&path).with_prefix("media/copy/");
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert_eq!(summary.total_objects, 3);
    assert!(!analysis.has_duplicates());
}

#[test]
fn test_json_lines_listing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("listing.jsonl");
    let content = concat!(
        r#"{"Contents": [{"Key": "a/b/1", "ETag": "x", "Size": 4, "LastModified": "2024-01-01T00:00:00Z"}]}"#,
        "\n",
        r#"{"Contents": [{"Key": "a/b/2", "ETag": "x", "Size": 4, "LastModified": "2024-01-01T00:00:00Z"}]}"#,
        "\n",
    );
    fs::write(&path, content).unwrap();

    let (_, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&ListingSource::new(&path))
        .unwrap();
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.duplicate_groups, 1);
}

#[test]
fn test_unreadable_listing_is_source_unavailable() {
    let dir = tempdir().unwrap();
    let source = ListingSource::new(dir.path().join("missing.json"));

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap_err();
    assert!(matches!(
        err,
        FinderError::SourceUnavailable(SourceError::Io { .. })
    ));
}

#[test]
fn test_malformed_listing_is_source_unavailable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"Contents": [{"Key": "a", "Size": "big"}]}"#).unwrap();

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&ListingSource::new(&path))
        .unwrap_err();
    assert!(matches!(
        err,
        FinderError::SourceUnavailable(SourceError::Parse { .. })
    ));
}

#[test]
fn test_missing_etag_is_invalid_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("listing.json");
    fs::write(&path, r#"{"Contents": [{"Key": "a/b", "Size": 3}]}"#).unwrap();

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&ListingSource::new(&path))
        .unwrap_err();
    assert!(matches!(err, FinderError::InvalidRecord { ref key, .. } if key == "a/b"));
}

#[test]
fn test_describe_mentions_path() {
    let source = ListingSource::new("some/listing.json");
    assert!(source.describe().contains("some/listing.json"));
    assert_eq!(ListingSource::new("-").describe(), "<stdin>");
}
