//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiConfig as RuntimeApiConfig;
use crate::storage::StorageConfig as RuntimeStorageConfig;
use crate::stream::StreamConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Player store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_file_name() -> String {
    "userlist.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}

impl StorageConfig {
    pub fn to_runtime(&self) -> RuntimeStorageConfig {
        RuntimeStorageConfig {
            data_dir: PathBuf::from(&self.data_dir),
            file_name: self.file_name.clone(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_stream_interval")]
    pub stream_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_stream_interval() -> u64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            stream_interval_secs: default_stream_interval(),
        }
    }
}

impl ApiConfig {
    pub fn to_runtime(&self) -> RuntimeApiConfig {
        RuntimeApiConfig {
            host: self.host.clone(),
            port: self.port,
            static_dir: PathBuf::from(&self.static_dir),
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            // A zero interval would spin
            interval: Duration::from_secs(self.stream_interval_secs.max(1)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    ///
    /// Returns the config plus a warning for every override that could not
    /// be parsed.
    pub fn from_env() -> (Self, Vec<String>) {
        let mut config = Config::default();
        let warnings = config.apply_env_overrides();
        (config, warnings)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        let mut config = Self::load(path)?;
        let warnings = config.apply_env_overrides();
        Ok((config, warnings))
    }

    /// Load from default locations or environment
    ///
    /// Runs before the subscriber is installed, so failures are returned as
    /// warnings for the caller to log.
    pub fn load_default() -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let config_paths = [
            dirs::config_dir().map(|p| p.join("clicker-server").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok((config, env_warnings)) => {
                        warnings.extend(env_warnings);
                        return (config, warnings);
                    }
                    Err(e) => warnings.push(e.to_string()),
                }
            }
        }

        // Fall back to environment-only config
        let (config, env_warnings) = Self::from_env();
        warnings.extend(env_warnings);
        (config, warnings)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, returning a warning per unparsable value
    fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        // Storage overrides
        if let Some(data_dir) = lookup("CLICKER_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API overrides
        if let Some(host) = lookup("CLICKER_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(e) => warnings.push(format!(
                    "Ignoring PORT={:?}: {} (using {})",
                    port, e, self.api.port
                )),
            }
        }
        if let Some(dir) = lookup("CLICKER_STATIC_DIR") {
            self.api.static_dir = dir;
        }
        if let Some(secs) = lookup("CLICKER_STREAM_INTERVAL_SECS") {
            match secs.parse() {
                Ok(s) => self.api.stream_interval_secs = s,
                Err(e) => warnings.push(format!(
                    "Ignoring CLICKER_STREAM_INTERVAL_SECS={:?}: {} (using {})",
                    secs, e, self.api.stream_interval_secs
                )),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("CLICKER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CLICKER_LOG_FORMAT") {
            self.logging.format = format;
        }

        warnings
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Clicker Server Configuration
#
# Environment variables override these settings:
# - PORT
# - CLICKER_HOST
# - CLICKER_DATA_DIR
# - CLICKER_STATIC_DIR
# - CLICKER_STREAM_INTERVAL_SECS
# - CLICKER_LOG_LEVEL
# - CLICKER_LOG_FORMAT

[storage]
# Directory holding the user list
data_dir = "data"

# User list file name inside data_dir
file_name = "userlist.json"

[api]
# Server host
host = "0.0.0.0"

# Server port
port = 3000

# Directory with the prebuilt game pages
static_dir = "public"

# Seconds between player-count stream events
stream_interval_secs = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
