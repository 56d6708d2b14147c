use chrono::Utc;
use s3dups::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use s3dups::source::{MemorySource, ObjectRecord};

fn object(key: &str, hash: &str, size: u64) -> ObjectRecord {
    ObjectRecord::new(key, hash, size, Utc::now())
}

#[test]
fn test_scan_empty_source() {
    let finder = DuplicateFinder::with_defaults();
    let (analysis, summary) = finder.find_duplicates(&MemorySource::default()).unwrap();

    assert!(analysis.duplicates.is_empty());
    assert!(analysis.clusters.unwrap().is_empty());
    assert_eq!(summary.total_objects, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_objects() {
    let source = MemorySource::new(vec![
        object("a.txt", "H1", 1),
        object("b.txt", "H2", 1),
        object("c.txt", "H3", 1),
    ]);
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert!(!analysis.has_duplicates());
    assert_eq!(summary.total_objects, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_single_segment_keys_form_no_set() {
    // The longest shared run of x/1.dat and x/2.dat is ".dat", which has no
    // delimiter, so the pair is not clustered.
    let source = MemorySource::new(vec![
        object("x/1.dat", "H1", 100),
        object("x/2.dat", "H1", 100),
        object("y/1.dat", "H2", 100),
    ]);
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert_eq!(analysis.duplicates.len(), 1);
    assert_eq!(analysis.duplicates["H1"].len(), 2);
    assert!(analysis.clusters.unwrap().is_empty());
    assert_eq!(summary.duplicate_objects, 1);
}

#[test]
fn test_nested_keys_form_one_set() {
    let source = MemorySource::new(vec![
        object("data/x/1.dat", "H1", 100),
        object("data/x/2.dat", "H1", 100),
        object("data/y/1.dat", "H2", 100),
    ]);
    let (analysis, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    let clusters = analysis.clusters.unwrap();
    assert_eq!(clusters.len(), 1);

    let set = clusters.get("data/x").unwrap();
    assert_eq!(set.keys.len(), 2);
    // data/x/2.dat's sibling is data/x/1.dat, annotated with this very prefix
    assert_eq!(set.cross_links.len(), 1);
    assert_eq!(set.cross_links[0].prefix, "data/x");
    assert_eq!(set.cross_links[0].count, 1);
    assert_eq!(set.total_size(), 200);
}

#[test]
fn test_keys_without_shared_directory_form_no_set() {
    let source = MemorySource::new(vec![
        object("a/file1.txt", "H1", 10),
        object("b/file2.txt", "H1", 10),
    ]);
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert_eq!(summary.duplicate_groups, 1);
    assert!(analysis.clusters.unwrap().is_empty());
}

#[test]
fn test_copied_tree_cross_links() {
    let source = MemorySource::new(vec![
        object("photos/2023/a.jpg", "H1", 1000),
        object("photos/2023/b.jpg", "H2", 2000),
        object("photos/2023/c.jpg", "H3", 3000),
        object("backup/photos/2023/a.jpg", "H1", 1000),
        object("backup/photos/2023/b.jpg", "H2", 2000),
        object("backup/photos/2023/c.jpg", "H3", 3000),
    ]);
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert_eq!(summary.duplicate_groups, 3);
    assert_eq!(summary.reclaimable_space, 6000);

    let clusters = analysis.clusters.unwrap();
    let prefixes: Vec<&str> = clusters.iter().map(|c| c.prefix.as_str()).collect();
    assert_eq!(prefixes, vec!["backup/photos/2023", "photos/2023"]);

    let backup = clusters.get("backup/photos/2023").unwrap();
    assert_eq!(backup.len(), 3);
    assert_eq!(backup.cross_links.len(), 1);
    assert_eq!(backup.cross_links[0].prefix, "photos/2023");
    assert_eq!(backup.cross_links[0].count, 2);

    // The boundary pair between the two trees lands in the shorter prefix
    let photos = clusters.get("photos/2023").unwrap();
    assert_eq!(photos.len(), 4);
    assert!(photos.keys.contains("backup/photos/2023/c.jpg"));
    assert_eq!(photos.cross_links[0].prefix, "backup/photos/2023");
    assert_eq!(photos.cross_links[0].count, 2);
    assert_eq!(photos.cross_links[1].prefix, "photos/2023");
    assert_eq!(photos.cross_links[1].count, 1);
}

#[test]
fn test_zero_size_objects_are_excluded() {
    let source = MemorySource::new(vec![
        object("logs/a/.keep", "EMPTY", 0),
        object("logs/b/.keep", "EMPTY", 0),
        object("logs/a/x.log", "H1", 5),
    ]);
    let (analysis, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap();

    assert!(analysis.duplicates.is_empty());
    assert_eq!(analysis.zero_size.len(), 2);
    assert_eq!(summary.zero_size_objects, 2);
    assert_eq!(summary.total_objects, 3);
}

#[test]
fn test_invalid_record_aborts_scan() {
    let source = MemorySource::with_pages(vec![
        vec![object("a/1", "H1", 5)],
        vec![object("", "H1", 5)],
    ]);
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&source)
        .unwrap_err();
    assert!(matches!(err, FinderError::InvalidRecord { .. }));
}

#[test]
fn test_simple_mode() {
    let source = MemorySource::new(vec![
        object("data/x/1.dat", "H1", 100),
        object("data/x/2.dat", "H1", 100),
    ]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_simple(true));
    let (analysis, summary) = finder.find_duplicates(&source).unwrap();

    assert!(analysis.clusters.is_none());
    assert_eq!(summary.duplicate_groups, 1);
}
