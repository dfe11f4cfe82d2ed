//! Configuration types for searching, pagination and persistence.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default SerpAPI search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search";

/// Results requested per page. SerpAPI caps `num` at 100.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Configuration for one harvesting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Search API endpoint that query URLs are built against.
    pub endpoint: String,

    /// Page-size ceiling. A page with exactly this many results means
    /// another page may follow. Default: 100.
    pub page_size: usize,

    /// Upper bound on pages fetched per query URL.
    ///
    /// Guards against an upstream that always returns a full page.
    /// Default: 50 (5000 results per query).
    pub max_pages: usize,

    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Sustained request rate against the search API. Default: 5.
    pub requests_per_second: u32,

    /// Cities processed concurrently. Default: 1 (sequential).
    pub city_concurrency: usize,

    /// Retry policy for transient transport failures.
    pub retry: RetryPolicy,

    /// Directory holding per-country seen-domain state.
    pub state_dir: PathBuf,

    /// Directory the JSON sink writes result files into.
    pub results_dir: PathBuf,

    /// Country settings file consumed by the query builder.
    pub countries_path: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: 50,
            request_timeout_secs: 30,
            requests_per_second: 5,
            city_concurrency: 1,
            retry: RetryPolicy::default(),
            state_dir: PathBuf::from("."),
            results_dir: PathBuf::from("results"),
            countries_path: PathBuf::from("countries.json"),
        }
    }
}

impl HarvestConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_city_concurrency(mut self, concurrency: usize) -> Self {
        self.city_concurrency = concurrency;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check values that would otherwise stall or misbehave at runtime.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::HarvestError;

        if self.page_size == 0 {
            return Err(HarvestError::Config("page_size must be > 0".into()));
        }
        if self.max_pages == 0 {
            return Err(HarvestError::Config("max_pages must be > 0".into()));
        }
        if self.requests_per_second == 0 {
            return Err(HarvestError::Config(
                "requests_per_second must be > 0".into(),
            ));
        }
        if self.city_concurrency == 0 {
            return Err(HarvestError::Config("city_concurrency must be > 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(HarvestError::Config(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        url::Url::parse(&self.endpoint)
            .map_err(|e| HarvestError::Config(format!("invalid endpoint: {}", e)))?;
        Ok(())
    }
}

/// Bounded exponential backoff for retryable transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per page, including the first. Default: 3.
    pub max_attempts: u32,

    /// Delay before the first retry. Later retries wait `base * 3^n`.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_backoff_ms: 0,
        }
    }

    /// Retry without sleeping, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff_ms: 0,
        }
    }

    /// Delay after the given zero-based failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(3u64.saturating_pow(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.city_concurrency, 1);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: HarvestConfig =
            serde_json::from_str(r#"{"max_pages": 3, "retry": {"max_attempts": 5}}"#).unwrap();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_backoff_ms, 500);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(HarvestConfig::new().with_page_size(0).validate().is_err());
        assert!(HarvestConfig::new().with_max_pages(0).validate().is_err());
        assert!(HarvestConfig::new()
            .with_city_concurrency(0)
            .validate()
            .is_err());
        assert!(HarvestConfig::new()
            .with_endpoint("not a url")
            .validate()
            .is_err());
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 500,
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1500));
        assert_eq!(policy.backoff(2), Duration::from_millis(4500));
        assert_eq!(RetryPolicy::immediate(4).backoff(3), Duration::ZERO);
    }
}
