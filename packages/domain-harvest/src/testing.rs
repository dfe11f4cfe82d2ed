//! Testing utilities including mock implementations.
//!
//! These let applications and tests drive the whole pipeline without making
//! network calls or touching the filesystem.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{HarvestError, Result};
use crate::traits::transport::SearchTransport;

pub use crate::sinks::memory::MemorySink;
pub use crate::stores::memory::MemorySeenStore;

/// A mock search transport.
///
/// Serves canned bodies by exact URL, can fail a URL a given number of times
/// before succeeding, and can delay responses to shuffle completion order.
/// Clones share state, so keep one clone around to inspect `calls()`.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Canned bodies by URL
    bodies: Arc<RwLock<HashMap<String, String>>>,

    /// Body served for URLs without a canned body
    fallback: Arc<RwLock<Option<String>>>,

    /// Queued failures by URL, consumed front to back
    failures: Arc<RwLock<HashMap<String, VecDeque<Option<u16>>>>>,

    /// Artificial latency by URL
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.write().unwrap().insert(url.into(), body.into());
        self
    }

    /// Serve `body` for every URL without a canned body.
    pub fn with_fallback(self, body: impl Into<String>) -> Self {
        *self.fallback.write().unwrap() = Some(body.into());
        self
    }

    /// Fail the next `times` requests to `url`.
    ///
    /// `status: None` simulates a connection failure, `Some(code)` an HTTP
    /// error response.
    pub fn fail_times(self, url: impl Into<String>, times: usize, status: Option<u16>) -> Self {
        self.failures
            .write()
            .unwrap()
            .entry(url.into())
            .or_default()
            .extend(std::iter::repeat(status).take(times));
        self
    }

    /// Delay responses for `url`.
    pub fn with_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of requests made to `url`.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<String> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .write()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        if let Some(status) = failure {
            return Err(match status {
                Some(code) => HarvestError::http_status(url, code, "mock HTTP error"),
                None => HarvestError::transport(url, "mock connection refused"),
            });
        }

        if let Some(body) = self.bodies.read().unwrap().get(url) {
            return Ok(body.clone());
        }
        if let Some(body) = self.fallback.read().unwrap().as_ref() {
            return Ok(body.clone());
        }
        Err(HarvestError::http_status(url, 404, "no mock body for URL"))
    }
}

/// Build a SerpAPI-shaped page body from result links.
///
/// Titles and snippets are derived from the position on the page.
pub fn organic_page<I, S>(links: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let results: Vec<serde_json::Value> = links
        .into_iter()
        .enumerate()
        .map(|(i, link)| {
            serde_json::json!({
                "position": i + 1,
                "title": format!("Result {}", i + 1),
                "link": link.as_ref(),
                "snippet": format!("Snippet {}", i + 1),
            })
        })
        .collect();

    serde_json::json!({
        "search_metadata": {"status": "Success"},
        "organic_results": results,
    })
    .to_string()
}

/// A page of `count` results on distinct domains `site-<offset+i>.<tld>`.
pub fn numbered_page(tld: &str, offset: usize, count: usize) -> String {
    organic_page((offset..offset + count).map(|i| format!("https://www.site-{}.{}/", i, tld)))
}
