use dupescan::config::Config;
use dupescan::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupescan::scanner::{IndexerConfig, ScanError};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

fn finder(indexer: IndexerConfig, check_contents: bool) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_indexer_config(indexer)
            .with_check_contents(check_contents),
    )
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.duplicate_size, 0);
}

#[test]
fn test_scan_unique_sizes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"a");
    write(dir.path(), "b.txt", b"bb");
    write(dir.path(), "c.txt", b"ccc");

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.total_size, 6);
}

#[test]
fn test_size_only_pairs_equal_sizes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");
    write(dir.path(), "d.txt", b"hi");

    let (pairs, summary) = finder(IndexerConfig::default(), false)
        .find_duplicates(dir.path())
        .unwrap();

    // Size mode cannot tell "hello" from "world"
    assert_eq!(pairs.len(), 2);
    assert_eq!(summary.duplicate_count, 2);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_size, 10);
    assert!(!summary.check_contents);

    let originals: HashSet<_> = pairs.iter().map(|p| p.original.path.clone()).collect();
    assert_eq!(originals.len(), 1);
    let original = originals.into_iter().next().unwrap();
    assert!(pairs.iter().all(|p| p.duplicate.path != original));
}

#[test]
fn test_check_contents_separates_equal_sizes() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"hello");
    let b = write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");
    write(dir.path(), "d.txt", b"hi");

    let (pairs, summary) = finder(IndexerConfig::default(), true)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert!(summary.check_contents);
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.duplicate_size, 5);

    let pair = &pairs[0];
    let members: HashSet<_> = [pair.duplicate.path.clone(), pair.original.path.clone()].into();
    let expected: HashSet<_> = [
        std::path::absolute(a).unwrap(),
        std::path::absolute(b).unwrap(),
    ]
    .into();
    assert_eq!(members, expected);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let (pairs, summary) = finder(IndexerConfig::default(), true)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(summary.duplicate_size, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub").join("deeper");
    fs::create_dir_all(&sub).unwrap();
    write(dir.path(), "top.txt", b"same bytes");
    write(&sub, "nested.txt", b"same bytes");

    let (pairs, _) = finder(IndexerConfig::default(), true)
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(pairs.len(), 1);
}

#[test]
fn test_current_folder_only() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write(dir.path(), "top.txt", b"same bytes");
    write(&sub, "nested.txt", b"same bytes");

    let config = IndexerConfig::default().with_current_folder_only(true);
    let (pairs, summary) = finder(config, true).find_duplicates(dir.path()).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_pattern_matches_file_name() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.jpg", b"picture");
    write(dir.path(), "two.jpg", b"picture");
    write(dir.path(), "three.png", b"picture");

    let config = IndexerConfig::default().with_pattern("*.jpg");
    let (pairs, summary) = finder(config, true).find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(pairs.len(), 1);
    for pair in &pairs {
        assert_eq!(pair.duplicate.path.extension().unwrap(), "jpg");
        assert_eq!(pair.original.path.extension().unwrap(), "jpg");
    }
}

#[test]
fn test_pattern_non_matches_are_not_excluded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.txt", b"x");
    write(dir.path(), "skip.bin", b"x");

    let config = IndexerConfig::default().with_pattern("*.txt");
    let (_, summary) = finder(config, false).find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.excluded_files, 0);
}

#[test]
fn test_exclude_keyword_is_case_insensitive() {
    let dir = tempdir().unwrap();
    let excluded = dir.path().join("My_Backup_Dir");
    fs::create_dir(&excluded).unwrap();
    write(dir.path(), "a.txt", b"data");
    write(&excluded, "a.txt", b"data");

    let config = IndexerConfig::default().with_exclude_keywords(vec!["_backup_".to_string()]);
    let (pairs, summary) = finder(config, true).find_duplicates(dir.path()).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.excluded_by_keyword, 1);
    assert_eq!(summary.excluded_files, 1);
}

#[test]
fn test_min_size_excludes_small_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1", &[1u8; 500]);
    write(dir.path(), "small2", &[1u8; 500]);
    write(dir.path(), "big1", &[2u8; 2048]);
    write(dir.path(), "big2", &[2u8; 2048]);

    let config = IndexerConfig::default().with_min_size(1024);
    let (pairs, summary) = finder(config, true).find_duplicates(dir.path()).unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].duplicate.size, 2048);
    assert_eq!(summary.excluded_by_size, 2);
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.total_size, 4096);
}

#[test]
fn test_min_filesize_string_from_config() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1", &[3u8; 500]);
    write(dir.path(), "small2", &[3u8; 500]);
    write(dir.path(), "large1", &[4u8; 1024]);
    write(dir.path(), "large2", &[4u8; 1024]);

    let config = Config {
        dir: dir.path().to_path_buf(),
        min_filesize: "1KB".to_string(),
        check_contents: true,
        ..Default::default()
    };
    let finder_config = config.to_finder_config();
    assert_eq!(finder_config.indexer_config.min_size, 1024);

    let (pairs, summary) = DuplicateFinder::new(finder_config)
        .find_duplicates(&config.dir)
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].duplicate.size, 1024);
    assert_eq!(summary.excluded_by_size, 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_reported_paths_are_absolute() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");

    let (pairs, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].duplicate.path.is_absolute());
    assert!(pairs[0].original.path.is_absolute());
}

#[test]
fn test_repeated_scans_agree() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("f{}.dat", i), &[i as u8 % 2; 128]);
    }

    let finder = finder(IndexerConfig::default(), true);
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
}

#[test]
fn test_invalid_pattern_is_error() {
    let dir = tempdir().unwrap();
    let config = IndexerConfig::default().with_pattern("[unclosed");

    let err = finder(config, false).find_duplicates(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        FinderError::ScanError(ScanError::InvalidPattern { .. })
    ));
}

#[test]
fn test_missing_root_is_error() {
    let dir = tempdir().unwrap();
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));
}

#[test]
fn test_file_root_is_error() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "file.txt", b"x");
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&file)
        .unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}
