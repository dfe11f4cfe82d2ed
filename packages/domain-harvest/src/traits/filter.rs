//! Domain filter trait.
//!
//! The search client runs every candidate domain through a chain of filters
//! and drops it as soon as one of them declines.

use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait DomainFilter: Send + Sync {
    /// Whether a result for `domain` should be kept.
    ///
    /// Filters may record the domain as a side effect.
    async fn admit(&self, domain: &str) -> bool;
}

#[async_trait]
impl<T: DomainFilter + ?Sized> DomainFilter for Arc<T> {
    async fn admit(&self, domain: &str) -> bool {
        (**self).admit(domain).await
    }
}
