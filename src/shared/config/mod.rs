//! Application configuration module
//!
//! Settings come from three layers, later ones winning: built-in
//! defaults, an optional TOML file named by `TASKBOARD_CONFIG`, and
//! environment variables.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default per-connection realtime queue depth
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

const DEV_JWT_SECRET: &str = "taskboard-dev-secret-change-me";

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Postgres URL; `None` runs on the in-memory store
    pub database_url: Option<String>,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Per-connection realtime queue depth
    pub channel_capacity: usize,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Layout of the optional TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind_addr: Option<String>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    channel_capacity: Option<usize>,
    log_filter: Option<String>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Defaults, then `TASKBOARD_CONFIG` file, then environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Ok(path) = std::env::var("TASKBOARD_CONFIG") {
            builder = builder.merge_file(Path::new(&path))?;
        }
        builder.merge_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "channel_capacity",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// True when the secret is the built-in development value
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    bind_addr: Option<String>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    channel_capacity: Option<usize>,
    log_filter: Option<String>,
}

impl AppConfigBuilder {
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Overlay values from a TOML file
    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.merge_toml(&raw)
    }

    /// Overlay values from TOML text
    pub fn merge_toml(mut self, raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if file.bind_addr.is_some() {
            self.bind_addr = file.bind_addr;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if file.jwt_secret.is_some() {
            self.jwt_secret = file.jwt_secret;
        }
        if file.channel_capacity.is_some() {
            self.channel_capacity = file.channel_capacity;
        }
        if file.log_filter.is_some() {
            self.log_filter = file.log_filter;
        }
        Ok(self)
    }

    /// Overlay values from the process environment
    pub fn merge_env(mut self) -> Self {
        if let Ok(addr) = std::env::var("TASKBOARD_BIND") {
            self.bind_addr = Some(addr);
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(capacity) = std::env::var("TASKBOARD_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.channel_capacity = Some(capacity);
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            self.log_filter = Some(filter);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let bind_addr = match self.bind_addr {
            Some(addr) => addr
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "bind_addr",
                    message: format!("'{}' is not a socket address", addr),
                })?,
            None => defaults.bind_addr,
        };
        let config = AppConfig {
            bind_addr,
            database_url: self.database_url.filter(|u| !u.is_empty()),
            jwt_secret: self.jwt_secret.unwrap_or(defaults.jwt_secret),
            channel_capacity: self.channel_capacity.unwrap_or(defaults.channel_capacity),
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("cannot read config file {path}: {message}")]
    Io { path: String, message: String },
    #[error("cannot parse config file: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::builder().build().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.uses_dev_secret());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::builder()
            .bind_addr("127.0.0.1:8080")
            .jwt_secret("s3cret")
            .channel_capacity(8)
            .build()
            .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.channel_capacity, 8);
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_matches!(
            AppConfig::builder().bind_addr("nowhere").build(),
            Err(ConfigError::InvalidValue { key: "bind_addr", .. })
        );
        assert_matches!(
            AppConfig::builder().channel_capacity(0).build(),
            Err(ConfigError::InvalidValue { key: "channel_capacity", .. })
        );
        assert_matches!(
            AppConfig::builder().jwt_secret("").build(),
            Err(ConfigError::MissingValue("jwt_secret"))
        );
        assert_matches!(
            AppConfig::builder().database_url("mysql://x").build(),
            Err(ConfigError::InvalidUrl(_))
        );
    }

    #[test]
    fn test_toml_file_layer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_addr = \"127.0.0.1:4000\"\nchannel_capacity = 16").unwrap();
        let config = AppConfig::builder()
            .merge_file(file.path())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.bind_addr.port(), 4000);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        assert_matches!(
            AppConfig::builder().merge_toml("colour = \"blue\""),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    #[serial]
    fn test_env_layer_wins_over_file() {
        std::env::set_var("TASKBOARD_BIND", "127.0.0.1:5000");
        let config = AppConfig::builder()
            .merge_toml("bind_addr = \"127.0.0.1:4000\"")
            .unwrap()
            .merge_env()
            .build();
        std::env::remove_var("TASKBOARD_BIND");
        assert_eq!(config.unwrap().bind_addr.port(), 5000);
    }
}
