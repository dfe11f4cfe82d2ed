//! HTTP transport for the search API.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{HarvestError, Result};
use crate::security::redact_url;
use crate::traits::transport::SearchTransport;

/// reqwest-backed search transport.
///
/// # Example
///
/// ```rust,ignore
/// use domain_harvest::transports::{HttpTransport, TransportExt};
///
/// let transport = HttpTransport::new(Duration::from_secs(30))?.rate_limited(5);
/// let body = transport.get(&query_url).await?;
/// ```
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("domain-harvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HarvestError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let safe_url = redact_url(url);
        debug!(url = %safe_url, "Search API request");

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(url = %safe_url, error = %e, "Search API request failed");
            HarvestError::transport(&safe_url, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::http_status(
                safe_url,
                status.as_u16(),
                format!("HTTP {}: {}", status, truncate(&body, 200)),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| HarvestError::transport(safe_url, e.without_url().to_string()))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
