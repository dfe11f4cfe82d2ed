//! Search client: one query URL, paginated until the API runs dry.
//!
//! Each page is parsed against a strict schema, each hit is reduced to its
//! domain, and a hit is kept only if its domain is new to the current city
//! and every configured filter admits it.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::extract_domain;
use crate::error::{HarvestError, Result};
use crate::security::redact_url;
use crate::traits::filter::DomainFilter;
use crate::traits::transport::SearchTransport;
use crate::types::config::{HarvestConfig, RetryPolicy, DEFAULT_PAGE_SIZE};
use crate::types::results::{CityResultSet, DomainResult, QueryStats};

/// Offset parameter understood by the search API.
const START_PARAM: &str = "start";

#[derive(Debug, Deserialize)]
struct SerpPage {
    #[serde(default)]
    organic_results: Option<Vec<OrganicResult>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// One parsed page, before any dedup.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// Hits with a usable domain, in API order.
    pub items: Vec<DomainResult>,
    /// Organic results on the page, including ones without a usable link.
    pub result_count: usize,
}

/// Paginating search API client.
pub struct SearchClient<T: SearchTransport> {
    transport: T,
    filters: Vec<Arc<dyn DomainFilter>>,
    source_label: String,
    page_size: usize,
    max_pages: usize,
    retry: RetryPolicy,
}

impl<T: SearchTransport> SearchClient<T> {
    /// Create a client tagging its results with `source_label`.
    pub fn new(transport: T, source_label: impl Into<String>) -> Self {
        let defaults = HarvestConfig::default();
        Self {
            transport,
            filters: Vec::new(),
            source_label: source_label.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: defaults.max_pages,
            retry: defaults.retry,
        }
    }

    /// Take page size, page bound and retry policy from a config.
    pub fn with_config(mut self, config: &HarvestConfig) -> Self {
        self.page_size = config.page_size;
        self.max_pages = config.max_pages;
        self.retry = config.retry;
        self
    }

    /// Append a filter to the chain. Filters run in insertion order.
    pub fn with_filter(mut self, filter: Arc<dyn DomainFilter>) -> Self {
        self.filters.push(filter);
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

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch and parse a single page.
    ///
    /// Retryable transport failures are retried per the retry policy; parse
    /// failures surface immediately.
    pub async fn fetch_page(&self, query_url: &str) -> Result<FetchedPage> {
        let body = self.get_with_retry(query_url).await?;
        self.parse_page(query_url, &body)
    }

    /// Run the pagination loop for one query, appending survivors to `city`.
    ///
    /// Hits already appended stay in `city` if a later page fails.
    pub async fn collect_for_query(
        &self,
        base_query_url: &str,
        city: &mut CityResultSet,
    ) -> Result<QueryStats> {
        let safe_url = redact_url(base_query_url);
        let mut stats = QueryStats::default();
        let mut url = base_query_url.to_string();

        loop {
            let page = self.fetch_page(&url).await?;
            stats.pages += 1;
            stats.raw_items += page.result_count;

            let mut kept = 0;
            for item in page.items {
                if city.contains_domain(item.domain()) {
                    continue;
                }
                if !self.admit(item.domain()).await {
                    continue;
                }
                if city.push_unique(item) {
                    kept += 1;
                }
            }
            stats.kept += kept;

            debug!(
                url = %safe_url,
                page = stats.pages,
                results = page.result_count,
                kept,
                "Fetched search page"
            );

            if page.result_count < self.page_size {
                break;
            }
            if stats.pages >= self.max_pages {
                warn!(
                    url = %safe_url,
                    max_pages = self.max_pages,
                    raw_items = stats.raw_items,
                    "Page limit reached, stopping pagination"
                );
                break;
            }

            url = page_url(base_query_url, stats.raw_items)?;
        }

        info!(
            city = %city.city_name,
            url = %safe_url,
            pages = stats.pages,
            raw_items = stats.raw_items,
            kept = stats.kept,
            "Query complete"
        );
        Ok(stats)
    }

    async fn admit(&self, domain: &str) -> bool {
        for filter in &self.filters {
            if !filter.admit(domain).await {
                return false;
            }
        }
        true
    }

    async fn get_with_retry(&self, url: &str) -> Result<String> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.transport.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        url = %redact_url(url),
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Search request failed, retrying after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn parse_page(&self, url: &str, body: &str) -> Result<FetchedPage> {
        let safe_url = redact_url(url);

        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| HarvestError::parse(&safe_url, format!("invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(HarvestError::parse(&safe_url, "expected a JSON object"));
        }
        let page = SerpPage::deserialize(value)
            .map_err(|e| HarvestError::parse(&safe_url, e.to_string()))?;

        let organic = match (page.organic_results, page.error) {
            (Some(results), _) => results,
            (None, Some(error)) => {
                return Err(HarvestError::http_status(safe_url, 200, error));
            }
            (None, None) => Vec::new(),
        };

        let result_count = organic.len();
        let items = organic
            .into_iter()
            .filter_map(|r| match extract_domain(&r.link) {
                Some(domain) => Some(DomainResult::new(
                    domain,
                    r.link,
                    r.title,
                    r.snippet,
                    self.source_label.as_str(),
                )),
                None => {
                    debug!(link = %r.link, "Skipping result without a host");
                    None
                }
            })
            .collect();

        Ok(FetchedPage {
            items,
            result_count,
        })
    }
}

/// `base` with its `start` parameter set to `offset`.
///
/// Offset zero returns `base` unchanged.
pub fn page_url(base: &str, offset: usize) -> Result<String> {
    if offset == 0 {
        return Ok(base.to_string());
    }

    let mut url = Url::parse(base)
        .map_err(|e| HarvestError::Config(format!("invalid query URL: {}", e)))?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != START_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(START_PARAM, &offset.to_string());
    Ok(url.to_string())
}
