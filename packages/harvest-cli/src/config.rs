//! Runtime configuration for the harvest binary.
//!
//! Values come from the environment (a `.env` file is honoured) and can be
//! overridden by command-line flags.

use anyhow::{Context, Result};
use domain_harvest::{HarvestConfig, SecretString};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<SecretString>,
    pub searcher: String,
    pub harvest: HarvestConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut harvest = HarvestConfig::default();

        if let Some(endpoint) = get("HARVEST_ENDPOINT") {
            harvest.endpoint = endpoint;
        }
        if let Some(dir) = get("HARVEST_STATE_DIR") {
            harvest.state_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("HARVEST_RESULTS_DIR") {
            harvest.results_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("HARVEST_COUNTRIES") {
            harvest.countries_path = PathBuf::from(path);
        }
        if let Some(v) = get("HARVEST_MAX_PAGES") {
            harvest.max_pages = parse("HARVEST_MAX_PAGES", &v)?;
        }
        if let Some(v) = get("HARVEST_REQUESTS_PER_SECOND") {
            harvest.requests_per_second = parse("HARVEST_REQUESTS_PER_SECOND", &v)?;
        }
        if let Some(v) = get("HARVEST_CITY_CONCURRENCY") {
            harvest.city_concurrency = parse("HARVEST_CITY_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("HARVEST_TIMEOUT_SECS") {
            harvest.request_timeout_secs = parse("HARVEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("HARVEST_RETRY_ATTEMPTS") {
            harvest.retry.max_attempts = parse("HARVEST_RETRY_ATTEMPTS", &v)?;
        }

        Ok(Self {
            api_key: get("SERPAPI_API_KEY").map(SecretString::from),
            searcher: get("HARVEST_SEARCHER").unwrap_or_else(|| "harvest".to_string()),
            harvest,
        })
    }

    /// The API key, required for anything that talks to the search API.
    pub fn require_api_key(&self) -> Result<SecretString> {
        self.api_key
            .clone()
            .context("SERPAPI_API_KEY must be set")
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a valid number, got '{}'", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.require_api_key().is_err());
        assert_eq!(config.searcher, "harvest");
        assert_eq!(config.harvest.max_pages, 50);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = config_from(&[
            ("SERPAPI_API_KEY", "abc"),
            ("HARVEST_SEARCHER", "Hanna Y"),
            ("HARVEST_MAX_PAGES", "7"),
            ("HARVEST_CITY_CONCURRENCY", "3"),
            ("HARVEST_STATE_DIR", "/var/lib/harvest"),
        ])
        .unwrap();

        assert_eq!(config.require_api_key().unwrap().expose(), "abc");
        assert_eq!(config.searcher, "Hanna Y");
        assert_eq!(config.harvest.max_pages, 7);
        assert_eq!(config.harvest.city_concurrency, 3);
        assert_eq!(config.harvest.state_dir, PathBuf::from("/var/lib/harvest"));
    }

    #[test]
    fn test_bad_number_is_reported() {
        let err = config_from(&[("HARVEST_MAX_PAGES", "lots")]).unwrap_err();
        assert!(err.to_string().contains("HARVEST_MAX_PAGES"));
    }

    #[test]
    fn test_empty_api_key_counts_as_unset() {
        let config = config_from(&[("SERPAPI_API_KEY", "  ")]).unwrap();
        assert!(config.api_key.is_none());
    }
}
