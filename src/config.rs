//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub broadcaster: BroadcasterConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call `/api`; empty means any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Live update feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcasterConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Seconds before the first tick after the loop starts
    #[serde(default = "default_interval")]
    pub initial_delay_secs: u64,

    #[serde(default = "default_min_updates")]
    pub min_updates: usize,

    #[serde(default = "default_max_updates")]
    pub max_updates: usize,

    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,

    /// A connection that cannot take a frame within this time is closed
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

fn default_interval() -> u64 {
    5
}

fn default_min_updates() -> usize {
    1
}

fn default_max_updates() -> usize {
    3
}

fn default_max_subscribers() -> usize {
    1000
}

fn default_send_timeout() -> u64 {
    10
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            initial_delay_secs: default_interval(),
            min_updates: default_min_updates(),
            max_updates: default_max_updates(),
            max_subscribers: default_max_subscribers(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON seed file; the built-in dataset is used when unset
    pub seed_file: Option<String>,
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

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sensor-tree").join("config.toml")),
            Some(PathBuf::from("/etc/sensor-tree/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(host) = std::env::var("SENSOR_TREE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("SENSOR_TREE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Store overrides
        if let Ok(seed_file) = std::env::var("SENSOR_TREE_SEED_FILE") {
            self.store.seed_file = Some(seed_file);
        }

        // Broadcaster overrides
        if let Ok(interval) = std::env::var("SENSOR_TREE_BROADCAST_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse() {
                self.broadcaster.interval_secs = secs;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("SENSOR_TREE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SENSOR_TREE_LOG_FORMAT") {
            self.logging.format = format;
        }
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
    r#"# Sensor Tree Configuration
#
# Environment variables override these settings:
# - SENSOR_TREE_API_HOST
# - SENSOR_TREE_API_PORT
# - SENSOR_TREE_SEED_FILE
# - SENSOR_TREE_BROADCAST_INTERVAL_SECS
# - SENSOR_TREE_LOG_LEVEL
# - SENSOR_TREE_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

# Origins allowed to call /api (empty list allows any origin)
cors_origins = ["http://localhost:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[broadcaster]
# Seconds between simulated update batches
interval_secs = 5

# Delay before the first batch once a client connects
initial_delay_secs = 5

# Number of node renames per batch (inclusive range)
min_updates = 1
max_updates = 3

# Maximum concurrent WebSocket subscribers
max_subscribers = 1000

# Close a subscriber that cannot take a frame within this many seconds
send_timeout_secs = 10

[store]
# Optional JSON seed file: {"nodes": [...], "sensors": [...]}
# seed_file = "./seed.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.addr(), "0.0.0.0:8080");
        assert_eq!(config.broadcaster.interval_secs, 5);
        assert_eq!(config.broadcaster.initial_delay_secs, 5);
        assert_eq!(config.broadcaster.min_updates, 1);
        assert_eq!(config.broadcaster.max_updates, 3);
        assert!(config.store.seed_file.is_none());
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.broadcaster.max_subscribers, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 9000\n\n[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(config.logging.is_json());
        assert_eq!(config.broadcaster.max_updates, 3);
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();
        let invalid = Config::load(file.path());
        assert!(matches!(invalid, Err(ConfigError::Parse { .. })));
    }
}
