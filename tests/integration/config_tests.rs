use clap::Parser;
use dupescan::cli::Cli;
use dupescan::config::{Config, ConfigError};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

// Environment variables are process-wide; serialize tests that touch them.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "DUPESCAN_PATTERN",
    "DUPESCAN_IO_THREADS",
    "DUPESCAN_CHECK_CONTENTS",
    "DUPESCAN_MIN_FILESIZE",
    "DUPESCAN_EXCLUDE",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_config_load_from_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
dir = "/srv/photos"
pattern = "*.jpg"
check_contents = true
exclude = "thumbs,cache"
min_filesize = "1MB"
csv = "report.csv"
io_threads = 8
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.dir, PathBuf::from("/srv/photos"));
    assert_eq!(config.pattern, "*.jpg");
    assert!(config.check_contents);
    assert_eq!(config.exclude_keywords(), vec!["thumbs", "cache"]);
    assert_eq!(config.min_size_bytes(), 1024 * 1024);
    assert_eq!(config.csv, Some(PathBuf::from("report.csv")));
    assert_eq!(config.json, None);
    assert_eq!(config.io_threads, Some(8));
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "quiet = true\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert!(config.quiet);
    assert_eq!(config.pattern, "*");
    assert_eq!(config.dir, PathBuf::from("."));
    assert_eq!(config.min_size_bytes(), 0);
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "pattern = \"*.jpg\"\nio_threads = 2\n").unwrap();

    std::env::set_var("DUPESCAN_PATTERN", "*.png");
    std::env::set_var("DUPESCAN_CHECK_CONTENTS", "true");

    let result = Config::load(Some(&config_path));
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.pattern, "*.png");
    assert!(config.check_contents);
    assert_eq!(config.io_threads, Some(2));
}

#[test]
fn test_cli_overrides_env_and_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_filesize = \"10KB\"\n").unwrap();
    std::env::set_var("DUPESCAN_IO_THREADS", "16");

    let result = Config::load(Some(&config_path));
    clear_env();
    let mut config = result.unwrap();

    let cli = Cli::try_parse_from([
        "dupescan",
        "--min-filesize",
        "2MB",
        "--io-threads",
        "3",
        "--json",
        "out.json",
    ])
    .unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.min_size_bytes(), 2 * 1024 * 1024);
    assert_eq!(config.io_threads, Some(3));
    assert_eq!(config.json, Some(PathBuf::from("out.json")));
}

#[test]
fn test_malformed_value_is_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_malformed_min_filesize_falls_back_to_zero() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    std::env::set_var("DUPESCAN_MIN_FILESIZE", "12 parsecs");
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let result = Config::load(Some(&config_path));
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.min_filesize, "12 parsecs");
    assert_eq!(config.min_size_bytes(), 0);
    assert_eq!(config.to_finder_config().indexer_config.min_size, 0);
}

#[test]
fn test_bare_number_min_filesize_in_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_filesize = 1024\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.min_filesize, "1024");
    assert_eq!(config.min_size_bytes(), 1024);
}

#[test]
fn test_bare_numbers_from_env() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();
    std::env::set_var("DUPESCAN_MIN_FILESIZE", "1024");
    std::env::set_var("DUPESCAN_EXCLUDE", "2024");

    let result = Config::load(Some(&config_path));
    clear_env();
    let config = result.unwrap();

    assert_eq!(config.min_size_bytes(), 1024);
    assert_eq!(config.exclude_keywords(), vec!["2024"]);
}

#[test]
fn test_negative_min_filesize_falls_back_to_zero() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_filesize = -5\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.min_size_bytes(), 0);
}
