//! Layered application configuration.
//!
//! Settings are merged from, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. `DUPESCAN_*` environment variables
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! # Example
//!
//! ```toml
//! # ~/.config/dupescan/config.toml
//! pattern = "*.jpg"
//! check_contents = true
//! exclude = "thumbnails,.cache"
//! min_filesize = "100KB"
//! io_threads = 4
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cli::{parse_exclude_keywords, parse_size, Cli};
use crate::duplicates::{default_io_threads, FinderConfig};
use crate::scanner::IndexerConfig;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Errors from loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// The merged configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory to scan.
    pub dir: PathBuf,
    /// File name glob.
    pub pattern: String,
    /// Do not descend into subdirectories.
    pub current_folder_only: bool,
    /// Confirm duplicates by content hash.
    pub check_contents: bool,
    /// Comma-separated path keywords to exclude.
    #[serde(deserialize_with = "string_or_scalar")]
    pub exclude: String,
    /// Minimum file size, e.g. "10MB" or a bare byte count.
    #[serde(deserialize_with = "string_or_scalar")]
    pub min_filesize: String,
    /// Plain-text report destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// CSV report destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<PathBuf>,
    /// JSON report destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<PathBuf>,
    /// Suppress the per-match listing.
    pub quiet: bool,
    /// Hashing threads; unset means one per available core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads: Option<usize>,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Disable progress bars.
    pub no_progress: bool,
}

/// Read a free-form setting that TOML or the environment may have typed.
///
/// `min_filesize = 1024` and `DUPESCAN_EXCLUDE=2024` arrive as numbers;
/// they are kept as their textual form and interpreted later.
fn string_or_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pattern: "*".to_string(),
            current_folder_only: false,
            check_contents: false,
            exclude: String::new(),
            min_filesize: "0B".to_string(),
            output: None,
            csv: None,
            json: None,
            quiet: false,
            io_threads: None,
            follow_symlinks: false,
            no_progress: false,
        }
    }
}

impl Config {
    /// Load configuration from the given file or the default location.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit file is missing or the
    /// merged sources do not form a valid configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from_path(path)
            }
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    log::debug!("No platform config directory, using defaults and environment");
                    Self::extract(Self::base_figment())
                }
            },
        }
    }

    /// Load configuration using a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the file or environment holds
    /// malformed values.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading configuration from {}", path.display());
        Self::extract(Self::base_figment().merge(Toml::file(path)))
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Platform-specific default config path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Override settings with flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref dir) = cli.dir {
            self.dir.clone_from(dir);
        }
        if let Some(ref pattern) = cli.pattern {
            self.pattern.clone_from(pattern);
        }
        if let Some(ref exclude) = cli.exclude {
            self.exclude.clone_from(exclude);
        }
        if let Some(ref size) = cli.min_filesize {
            self.min_filesize.clone_from(size);
        }
        if cli.output.is_some() {
            self.output.clone_from(&cli.output);
        }
        if cli.csv.is_some() {
            self.csv.clone_from(&cli.csv);
        }
        if cli.json.is_some() {
            self.json.clone_from(&cli.json);
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = usize::try_from(threads).ok();
        }

        self.current_folder_only |= cli.current_folder_only;
        self.check_contents |= cli.check_contents;
        self.quiet |= cli.quiet;
        self.follow_symlinks |= cli.follow_symlinks;
        self.no_progress |= cli.no_progress;
    }

    /// Minimum size in bytes; malformed values fall back to zero.
    #[must_use]
    pub fn min_size_bytes(&self) -> u64 {
        parse_size(&self.min_filesize).unwrap_or_else(|e| {
            log::warn!("{}. Using default of 0 bytes.", e);
            0
        })
    }

    /// Exclude keywords as a list.
    #[must_use]
    pub fn exclude_keywords(&self) -> Vec<String> {
        parse_exclude_keywords(&self.exclude)
    }

    /// Build the finder configuration described by these settings.
    #[must_use]
    pub fn to_finder_config(&self) -> FinderConfig {
        let indexer = IndexerConfig::default()
            .with_pattern(self.pattern.clone())
            .with_current_folder_only(self.current_folder_only)
            .with_exclude_keywords(self.exclude_keywords())
            .with_min_size(self.min_size_bytes())
            .with_follow_symlinks(self.follow_symlinks);

        FinderConfig::default()
            .with_indexer_config(indexer)
            .with_check_contents(self.check_contents)
            .with_io_threads(self.io_threads.unwrap_or_else(default_io_threads))
    }
}
