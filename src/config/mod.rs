//! Configuration management for ebb.
//!
//! Configuration is read from `~/.config/ebb/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{RetentionWindow, DEFAULT_RETENTION_MONTHS};

pub const DEFAULT_MIN_FOLLOWERS: u64 = 100_000;
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path (default: `<data dir>/ebb/ebb.db`)
    pub database: Option<PathBuf>,
    pub api: ApiConfig,
    pub retention: RetentionConfig,
    pub pacing: PacingConfig,
    pub repair: RepairConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Access token for the acting account. Obtaining it is up to the user.
    pub bearer_token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com/1.1/".to_string(),
            bearer_token: None,
            timeout_secs: 10,
            user_agent: concat!("ebb/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub months: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            months: DEFAULT_RETENTION_MONTHS,
        }
    }
}

impl RetentionConfig {
    pub fn window(&self) -> RetentionWindow {
        RetentionWindow::months(self.months)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay between consecutive API calls in milliseconds
    pub delay_ms: u64,
    /// Items requested per timeline/likes page
    pub page_size: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PacingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub min_followers: u64,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            min_followers: DEFAULT_MIN_FOLLOWERS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Extracted account archive used to seed an empty database
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating a commented default file if absent.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/ebb/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("ebb").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# ebb configuration

# SQLite database location (defaults to the platform data directory)
# database = "/home/me/.local/share/ebb/ebb.db"

[api]
base_url = "https://api.twitter.com/1.1/"
# Access token for the account whose activity is retired
# bearer_token = ""
timeout_secs = 10

[retention]
# Activity older than this many months is retired
months = 3

[pacing]
# Delay between API calls (milliseconds)
delay_ms = 1000
# Items requested per page when syncing
page_size = 200

[repair]
# Accounts with fewer followers are left alone by `ebb repair`
min_followers = 100000

[archive]
# Extracted account archive used to seed an empty database
# path = "/home/me/archive"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config.retention.months, 3);
        assert_eq!(config.pacing.delay(), Duration::from_millis(1000));
        assert_eq!(config.pacing.page_size, 200);
        assert_eq!(config.repair.min_followers, 100_000);
        assert!(config.api.bearer_token.is_none());
        assert!(config.archive.path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[repair]
min_followers = 5000

[api]
bearer_token = "secret"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.repair.min_followers, 5000);
        assert_eq!(config.api.bearer_token.as_deref(), Some("secret"));
        assert_eq!(config.api.base_url, "https://api.twitter.com/1.1/");
        assert_eq!(config.retention.window(), RetentionWindow::default());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.pacing.delay_ms, 1000);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.retention.months, 3);

        // The written file round-trips through the parser.
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.repair.min_followers, DEFAULT_MIN_FOLLOWERS);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retention]\nmonths = \"three\"\n").unwrap();

        match Config::load_from(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
