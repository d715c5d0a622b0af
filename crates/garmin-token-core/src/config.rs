//! Application configuration management.
//!
//! Configuration selects the Garmin domain (`garmin.com` or `garmin.cn`),
//! the HTTP timeout, and where to fetch the OAuth consumer credentials.
//!
//! Configuration is read from `~/.config/garmin-token/config.json` when
//! present; `GARMIN_DOMAIN` and `GARMIN_OAUTH_CONSUMER_URL` override it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::Endpoints;

/// Application name used for the config directory path
const APP_NAME: &str = "garmin-token";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_DOMAIN: &str = "garmin.com";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub domain: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub oauth_consumer_url: Option<String>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(domain) = lookup("GARMIN_DOMAIN").filter(|d| !d.is_empty()) {
            self.domain = Some(domain);
        }
        if let Some(url) = lookup("GARMIN_OAUTH_CONSUMER_URL").filter(|u| !u.is_empty()) {
            self.oauth_consumer_url = Some(url);
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn endpoints(&self) -> Endpoints {
        let mut endpoints = Endpoints::for_domain(self.domain());
        if let Some(ref url) = self.oauth_consumer_url {
            endpoints.oauth_consumer = url.clone();
        }
        endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.domain(), "garmin.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));

        let endpoints = config.endpoints();
        assert_eq!(endpoints.sso, "https://sso.garmin.com/sso");
        assert_eq!(endpoints.connect_api, "https://connectapi.garmin.com");
    }

    #[test]
    fn test_overrides() {
        let mut config = Config {
            domain: Some("garmin.com".to_string()),
            ..Default::default()
        };
        config.apply_overrides(|key| match key {
            "GARMIN_DOMAIN" => Some("garmin.cn".to_string()),
            "GARMIN_OAUTH_CONSUMER_URL" => Some("https://example.test/consumer.json".to_string()),
            _ => None,
        });

        assert_eq!(config.domain(), "garmin.cn");
        let endpoints = config.endpoints();
        assert_eq!(endpoints.sso, "https://sso.garmin.cn/sso");
        assert_eq!(endpoints.oauth_consumer, "https://example.test/consumer.json");
    }

    #[test]
    fn test_empty_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.domain(), "garmin.com");
        assert!(config.oauth_consumer_url.is_none());
    }

    #[test]
    fn test_load_from_missing_and_malformed() {
        let dir = std::env::temp_dir().join(format!("garmin-token-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.json");
        assert!(Config::load_from(&missing).unwrap().domain.is_none());

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{"domain": "garmin.cn", "request_timeout_secs": 5}"#).unwrap();
        let config = Config::load_from(&good).unwrap();
        assert_eq!(config.domain(), "garmin.cn");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(Config::load_from(&bad).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
