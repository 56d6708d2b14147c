use chrono::Utc;
use s3dups::duplicates::{DuplicateFinder, FinderConfig};
use s3dups::session::{Session, SessionSettings, SESSION_VERSION};
use s3dups::source::{MemorySource, ObjectRecord};
use std::fs;
use tempfile::tempdir;

fn scanned_session(simple: bool) -> Session {
    let now = Utc::now();
    let source = MemorySource::new(vec![
        ObjectRecord::new("site/v1/logo.png", "E1", 2048, now),
        ObjectRecord::new("site/v1/logo@2x.png", "E2", 4096, now),
        ObjectRecord::new("site/v2/logo.png", "E1", 2048, now),
        ObjectRecord::new("site/v2/logo@2x.png", "E2", 4096, now),
    ]);
    let (analysis, summary) = DuplicateFinder::new(FinderConfig::default().with_simple(simple))
        .find_duplicates(&source)
        .unwrap();
    let settings = SessionSettings {
        simple,
        ..Default::default()
    };
    Session::new("memory", settings, analysis, summary)
}

#[test]
fn test_session_roundtrip_preserves_results() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.session.json");
    let session = scanned_session(false);

    session.save(&path).unwrap();
    let loaded = Session::load(&path).unwrap();

    assert_eq!(loaded.version, SESSION_VERSION);
    assert_eq!(loaded.source, "memory");
    assert_eq!(loaded.analysis, session.analysis);
    assert_eq!(loaded.summary, session.summary);

    let clusters = loaded.analysis.clusters.as_ref().unwrap();
    assert!(clusters.get("site/v1").is_some());
    assert!(clusters.get("site/v2").is_some());
}

#[test]
fn test_session_roundtrip_simple_mode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("simple.json");
    scanned_session(true).save(&path).unwrap();

    let (analysis, summary) = Session::load(&path).unwrap().into_results();
    assert!(analysis.clusters.is_none());
    assert_eq!(summary.duplicate_groups, 2);
}

#[test]
fn test_session_preserves_hash_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("order.json");
    scanned_session(false).save(&path).unwrap();

    let loaded = Session::load(&path).unwrap();
    let hashes: Vec<&String> = loaded.analysis.duplicates.keys().collect();
    assert_eq!(hashes, vec!["E1", "E2"]);
}

#[test]
fn test_session_truncated_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("truncated.json");
    let json = scanned_session(false).to_json().unwrap();
    fs::write(&path, &json[..json.len() / 2]).unwrap();

    let err = Session::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse session envelope"));
}

#[test]
fn test_session_edited_payload_fails_checksum() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edited.json");
    let json = scanned_session(false)
        .to_json()
        .unwrap()
        .replace("site/v2/logo.png", "site/v3/logo.png");
    fs::write(&path, json).unwrap();

    let err = Session::load(&path).unwrap_err();
    assert!(err.to_string().contains("integrity check failed"));
}
