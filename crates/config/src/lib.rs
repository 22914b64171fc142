//! Configuration loading, validation, and management for spendlens.
//!
//! Loads configuration from `~/.spendlens/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.spendlens/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream API and fetch-client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Tool handler defaults
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the USAspending v2 API (no trailing slash needed)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Minimum spacing between the start of two outbound requests
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Retries after the first attempt on rate limits and transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base; the n-th retry waits `base * 2^n`
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Per-request ceiling. The upstream API is slow on broad queries.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://api.usaspending.gov/api/v2".into()
}
fn default_request_delay_ms() -> u64 {
    100
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_base_delay_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    90
}
fn default_user_agent() -> String {
    format!("spendlens/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_delay_ms: default_request_delay_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Result limit for search tools when the caller gives none
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Number of recipients returned by competition analysis by default
    #[serde(default = "default_competition_limit")]
    pub competition_limit: u32,
}

fn default_limit() -> u32 {
    10
}
fn default_competition_limit() -> u32 {
    20
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            competition_limit: default_competition_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.spendlens/config.toml).
    ///
    /// Environment variables override the file:
    /// - `SPENDLENS_API_URL`
    /// - `SPENDLENS_REQUEST_DELAY_MS`
    /// - `SPENDLENS_MAX_RETRIES`
    /// - `SPENDLENS_TIMEOUT_SECS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SPENDLENS_API_URL") {
            self.api.base_url = url;
        }
        if let Some(v) = lookup("SPENDLENS_REQUEST_DELAY_MS") {
            self.api.request_delay_ms = parse_env("SPENDLENS_REQUEST_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("SPENDLENS_MAX_RETRIES") {
            self.api.max_retries = parse_env("SPENDLENS_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("SPENDLENS_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_env("SPENDLENS_TIMEOUT_SECS", &v)?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".spendlens")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(
                "api.base_url must start with http:// or https://".into(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be > 0".into(),
            ));
        }

        if self.api.max_retries > 10 {
            return Err(ConfigError::ValidationError(
                "api.max_retries must be at most 10".into(),
            ));
        }

        if self.tools.default_limit == 0 || self.tools.default_limit > 100 {
            return Err(ConfigError::ValidationError(
                "tools.default_limit must be between 1 and 100".into(),
            ));
        }

        if self.tools.competition_limit == 0 || self.tools.competition_limit > 100 {
            return Err(ConfigError::ValidationError(
                "tools.competition_limit must be between 1 and 100".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} has invalid value '{value}'")))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "https://api.usaspending.gov/api/v2");
        assert_eq!(config.api.request_delay_ms, 100);
        assert_eq!(config.api.max_retries, 2);
        assert_eq!(config.api.retry_base_delay_ms, 1000);
        assert_eq!(config.api.timeout_secs, 90);
        assert_eq!(config.tools.default_limit, 10);
        assert_eq!(config.tools.competition_limit, 20);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(parsed.api.timeout_secs, config.api.timeout_secs);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 30\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.max_retries, 2);
        assert_eq!(config.tools.default_limit, 10);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\ntimeout_secs = ").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_base_url_rejected() {
        let mut config = AppConfig::default();
        config.api.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api.request_delay_ms, 100);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SPENDLENS_API_URL", "http://localhost:8000/api/v2"),
            ("SPENDLENS_TIMEOUT_SECS", "15"),
            ("SPENDLENS_MAX_RETRIES", "4"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v2");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.api.max_retries, 4);
        assert_eq!(config.api.request_delay_ms, 100);
    }

    #[test]
    fn bad_env_value_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(|k| (k == "SPENDLENS_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SPENDLENS_TIMEOUT_SECS"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("api.usaspending.gov"));
        assert!(toml_str.contains("timeout_secs = 90"));
    }
}
