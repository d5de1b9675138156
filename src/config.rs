//! Configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding `backend.url`
pub const ENV_BACKEND_URL: &str = "DISCOVER_BACKEND_URL";
/// Environment variable overriding `backend.api_key`
pub const ENV_API_KEY: &str = "DISCOVER_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub count: CountConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// REST root of the hosted database, e.g. `https://xyz.example.co/rest/v1`
    pub url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: Option<String>,
    /// Listings table (or view) name
    pub table: String,
    /// Timeout for a single fetch request (milliseconds)
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountConfig {
    /// Quiet period after the last facet change before a count is requested
    pub debounce_ms: u64,
    /// Upper bound on a single count request
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: "listings".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            timeout_ms: 5_000,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl CountConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from `path` (defaults when absent) and apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(path)?;
                Self::from_toml(&content)?
            }
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.backend.api_key = Some(key);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.feed.page_size == 0 {
            return Err(Error::ConfigError {
                message: "feed.page_size must be at least 1".to_string(),
            });
        }
        if self.count.timeout_ms == 0 {
            return Err(Error::ConfigError {
                message: "count.timeout_ms must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.count.debounce(), Duration::from_millis(400));
        assert_eq!(config.count.timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.table, "listings");
        assert_eq!(config.feed.page_size, 20);
        assert!(config.backend.url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [backend]
            url = "https://db.example.com/rest/v1"

            [count]
            debounce_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(
            config.backend.url.as_deref(),
            Some("https://db.example.com/rest/v1")
        );
        assert_eq!(config.backend.table, "listings");
        assert_eq!(config.count.debounce_ms, 250);
        assert_eq!(config.count.timeout_ms, 5_000);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("[backend]\nurl = \"https://file\"").unwrap();
        config.apply_env(|key| match key {
            ENV_BACKEND_URL => Some("https://env".to_string()),
            ENV_API_KEY => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.url.as_deref(), Some("https://env"));
        assert!(config.backend.api_key.is_none());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let config = Config::from_toml("[feed]\npage_size = 0").unwrap();
        assert!(matches!(config.validate(), Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/discover.toml"))).unwrap();
        assert_eq!(config.backend.table, "listings");
        assert_eq!(config.count.debounce_ms, 400);
        assert_eq!(config.count.timeout_ms, 5_000);
        assert_eq!(config.feed.page_size, 20);
    }
}
