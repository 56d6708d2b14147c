//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (platform config dir, or `--config`)
//! 3. `S3DUPS_*` environment variables (e.g. `S3DUPS_DELIMITER=:`)
//! 4. CLI flags
//!
//! ```toml
//! delimiter = "/"
//! prefix = "photos/"
//! bucket = "media"
//! simple = false
//! output = "text"
//! progress = true
//! ```

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{OutputFormat, ScanArgs};
use crate::duplicates::{FinderConfig, DEFAULT_DELIMITER};
use crate::session::SessionSettings;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "S3DUPS_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key path delimiter used to derive common prefixes.
    pub delimiter: String,
    /// Only consider keys starting with this prefix.
    pub prefix: String,
    /// Bucket label for reports and sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Skip clustering.
    pub simple: bool,
    /// Default output format.
    pub output: OutputFormat,
    /// Show progress while scanning.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            prefix: String::new(),
            bucket: None,
            simple: false,
            output: OutputFormat::Text,
            progress: true,
        }
    }
}

impl Config {
    /// Load the configuration from `explicit`, or the platform default path.
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        match explicit.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No config directory available, using defaults and environment");
                Self::extract(Self::base())
            }
        }
    }

    /// Load the configuration from a specific TOML file.
    ///
    /// A missing file is not an error. An unreadable or invalid file is
    /// reported with a warning and the defaults are used instead.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            log::debug!("Loading config from {}", path.display());
        } else {
            log::debug!("Config file {} not found", path.display());
        }
        Self::extract(Self::base().merge(Toml::file(path)))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn extract(figment: Figment) -> Self {
        match figment.merge(Env::prefixed(ENV_PREFIX)).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "s3dups").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply the scan flags given on the command line.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        if let Some(ref delimiter) = args.delimiter {
            self.delimiter.clone_from(delimiter);
        }
        if let Some(ref prefix) = args.prefix {
            self.prefix.clone_from(prefix);
        }
        if args.bucket.is_some() {
            self.bucket.clone_from(&args.bucket);
        }
        if args.simple {
            self.simple = true;
        } else if args.no_simple {
            self.simple = false;
        }
        if let Some(output) = args.output {
            self.output = output;
        }
        if args.no_progress {
            self.progress = false;
        }
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_delimiter(self.delimiter.clone())
            .with_simple(self.simple)
    }

    /// Settings recorded in a saved session.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            bucket: self.bucket.clone(),
            prefix: self.prefix.clone(),
            delimiter: self.delimiter.clone(),
            simple: self.simple,
        }
    }
}
