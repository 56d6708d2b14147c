use chrono::{TimeZone, Utc};
use s3dups::duplicates::{Analysis, DuplicateFinder, FinderConfig, ScanSummary};
use s3dups::error::ExitCode;
use s3dups::output::{CsvOutput, JsonOutput, TextOutput};
use s3dups::source::ObjectRecord;

fn analyse(simple: bool) -> (Analysis, ScanSummary) {
    let ts = Utc.with_ymd_and_hms(2022, 11, 5, 9, 15, 0).unwrap();
    DuplicateFinder::new(FinderConfig::default().with_simple(simple))
        .analyze_records(vec![
            ObjectRecord::new("projects/alpha/report.pdf", "R1", 500, ts),
            ObjectRecord::new("projects/alpha/summary.pdf", "R2", 300, ts),
            ObjectRecord::new("archive/alpha/report.pdf", "R1", 500, ts),
            ObjectRecord::new("archive/alpha/summary.pdf", "R2", 300, ts),
            ObjectRecord::new("projects/alpha/notes.txt", "N1", 20, ts),
        ])
        .unwrap()
}

#[test]
fn test_json_document_shape() {
    let (analysis, summary) = analyse(false);
    let json = JsonOutput::new(&analysis, &summary, ExitCode::Success)
        .to_json_pretty()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["duplicates"].as_object().unwrap().len(), 2);
    let sets = parsed["sets"].as_object().unwrap();
    assert!(sets.contains_key("archive/alpha"));
    assert!(sets.contains_key("projects/alpha"));

    let archive = &parsed["sets"]["archive/alpha"];
    assert_eq!(archive["keys"].as_array().unwrap().len(), 2);
    assert_eq!(archive["statistics"][0]["prefix"], "projects/alpha");
    assert_eq!(archive["statistics"][0]["count"], 1);
    assert_eq!(parsed["summary"]["exit_code_name"], "SD000");
}

#[test]
fn test_csv_rows_cover_every_duplicate() {
    let (analysis, _) = analyse(false);
    let csv = CsvOutput::new(&analysis).to_string().unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    // Header plus two groups of two
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("1,R1,projects/alpha/report.pdf,500,"));
    assert!(lines[3].starts_with("2,R2,projects/alpha/summary.pdf,300,"));
    assert!(!csv.contains("notes.txt"));
}

#[test]
fn test_text_sets_report() {
    let (analysis, summary) = analyse(false);
    let text = TextOutput::new(&analysis, &summary).to_string().unwrap();

    assert!(text.starts_with("\"archive/alpha\":\n  objects: 2\n  size: 800\n  duplicates:\n"));
    assert!(text.contains("    - projects/alpha [1 objects]"));
    assert!(text.contains("    - archive/alpha [1 objects]"));
}

#[test]
fn test_text_simple_report() {
    let (analysis, summary) = analyse(true);
    let text = TextOutput::new(&analysis, &summary).to_string().unwrap();

    assert!(text.starts_with("R1:\n  projects/alpha/report.pdf: LastModified: 2022-11-05T09:15:00+00:00 Size: 500\n"));
    assert!(!text.contains("objects:"));
}

#[test]
fn test_exit_code_reflects_results() {
    let (analysis, _) = analyse(false);
    assert_eq!(
        ExitCode::for_results(analysis.has_duplicates()),
        ExitCode::Success
    );
    assert_eq!(
        ExitCode::for_results(Analysis::default().has_duplicates()),
        ExitCode::NoDuplicates
    );
}
