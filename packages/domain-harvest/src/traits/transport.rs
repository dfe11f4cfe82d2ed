//! Search transport trait.
//!
//! A transport performs exactly one GET against a fully-formed query URL and
//! hands back the response body. Pagination, parsing and retries live in the
//! search client, so transports stay trivial to fake.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Fetch the body of `url`.
    ///
    /// Fails with [`HarvestError::Transport`](crate::HarvestError::Transport)
    /// on connection problems or a non-success status.
    async fn get(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl<T: SearchTransport + ?Sized> SearchTransport for Arc<T> {
    async fn get(&self, url: &str) -> Result<String> {
        (**self).get(url).await
    }
}
