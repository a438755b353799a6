use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::output::{format_timestamp, write_atomic, CsvOutput, JsonOutput, TextOutput};
use filetime::FileTime;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn scan_with_duplicates(dir: &Path) -> Vec<dupescan::duplicates::DuplicatePair> {
    let data = dir.join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), b"duplicate content").unwrap();
    fs::write(data.join("b.txt"), b"duplicate content").unwrap();
    fs::write(data.join("c.txt"), b"duplicate content").unwrap();
    fs::write(data.join("unique.txt"), b"unique").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_check_contents(true));
    let (pairs, _) = finder.find_duplicates(&data).unwrap();
    pairs
}

#[test]
fn test_text_report_lists_duplicates_only() {
    let dir = tempdir().unwrap();
    let pairs = scan_with_duplicates(dir.path());
    assert_eq!(pairs.len(), 2);

    let target = dir.path().join("dupes.txt");
    write_atomic(&target, TextOutput::new(&pairs).render().as_bytes()).unwrap();

    let written = fs::read_to_string(&target).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);

    let original = pairs[0].original.path.to_string_lossy().into_owned();
    assert!(!lines.contains(&original.as_str()));
    for pair in &pairs {
        let duplicate = pair.duplicate.path.to_string_lossy().into_owned();
        assert!(lines.contains(&duplicate.as_str()));
    }
}

#[test]
fn test_csv_report_rows_match_pairs() {
    let dir = tempdir().unwrap();
    let pairs = scan_with_duplicates(dir.path());

    let target = dir.path().join("dupes.csv");
    let csv = CsvOutput::new(&pairs).to_string().unwrap();
    write_atomic(&target, csv.as_bytes()).unwrap();

    let mut reader = csv::Reader::from_path(&target).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "Duplicate Filepath",
            "Original Filepath",
            "Filesize (bytes)",
            "Last Modified Date",
            "Creation Date"
        ]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), pairs.len());
    for (record, pair) in records.iter().zip(&pairs) {
        assert_eq!(&record[0], pair.duplicate.path.to_string_lossy());
        assert_eq!(&record[1], pair.original.path.to_string_lossy());
        assert_eq!(&record[2], "17");
    }
}

#[test]
fn test_json_report_is_array_of_objects() {
    let dir = tempdir().unwrap();
    let pairs = scan_with_duplicates(dir.path());

    let target = dir.path().join("dupes.json");
    let mut buffer = Vec::new();
    JsonOutput::new(&pairs).write_to(&mut buffer).unwrap();
    write_atomic(&target, &buffer).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["Filesize (bytes)"], 17);
        assert!(entry["Duplicate Filepath"].as_str().unwrap().ends_with(".txt"));
        assert_eq!(entry["Creation Date"].as_str().unwrap().len(), 19);
    }
}

#[test]
fn test_failed_write_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let pairs = scan_with_duplicates(dir.path());

    // A non-empty directory in place of the destination makes the rename fail
    let blocked = dir.path().join("blocked");
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("occupied"), "x").unwrap();

    assert!(write_atomic(&blocked, TextOutput::new(&pairs).render().as_bytes()).is_err());

    assert!(blocked.join("occupied").exists());
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 2, "unexpected entries: {:?}", names);
}

#[test]
fn test_report_uses_duplicate_modification_time() {
    let dir = tempdir().unwrap();
    let old = dir.path().join("old.txt");
    let new = dir.path().join("new.txt");
    fs::write(&old, b"same").unwrap();
    fs::write(&new, b"same").unwrap();

    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    for path in [&old, &new] {
        filetime::set_file_mtime(path, FileTime::from_system_time(stamp)).unwrap();
    }

    let (pairs, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(pairs.len(), 1);

    let json = JsonOutput::new(&pairs).to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["Last Modified Date"], format_timestamp(stamp));
}
