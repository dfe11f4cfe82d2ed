//! Rate-limited transport wrapper.
//!
//! Wraps any SearchTransport with rate limiting using the governor crate, so
//! cities fetched concurrently still share one request budget.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::transport::SearchTransport;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A transport wrapper that enforces a request rate.
pub struct RateLimitedTransport<T: SearchTransport> {
    inner: T,
    limiter: Arc<DefaultRateLimiter>,
}

impl<T: SearchTransport> RateLimitedTransport<T> {
    /// Create a new rate-limited transport.
    ///
    /// A rate of zero is treated as one request per second.
    pub fn new(transport: T, requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Self::with_quota(transport, Quota::per_second(rate))
    }

    /// Create with a custom quota.
    pub fn with_quota(transport: T, quota: Quota) -> Self {
        Self {
            inner: transport,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: SearchTransport> SearchTransport for RateLimitedTransport<T> {
    async fn get(&self, url: &str) -> Result<String> {
        self.limiter.until_ready().await;
        self.inner.get(url).await
    }
}

/// Extension trait for easy rate limiting.
pub trait TransportExt: SearchTransport + Sized {
    /// Wrap this transport with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedTransport<Self> {
        RateLimitedTransport::new(self, requests_per_second)
    }
}

impl<T: SearchTransport + Sized> TransportExt for T {}
