//! Persistence medium for seen-domain sets.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;

/// Domains already delivered in earlier runs for one country.
pub type SeenDomainSet = HashSet<String>;

/// Storage backend for per-country seen-domain sets.
///
/// Implementations replace the whole set on `save`; merging is the duplicate
/// filter's job.
#[async_trait]
pub trait SeenDomainStore: Send + Sync {
    /// Read the persisted set, or `None` if nothing was ever saved.
    ///
    /// Unreadable or corrupt state is an error, not `None`.
    async fn load(&self, country: &str) -> Result<Option<SeenDomainSet>>;

    /// Replace the persisted set.
    async fn save(&self, country: &str, domains: &SeenDomainSet) -> Result<()>;
}

#[async_trait]
impl<T: SeenDomainStore + ?Sized> SeenDomainStore for Arc<T> {
    async fn load(&self, country: &str) -> Result<Option<SeenDomainSet>> {
        (**self).load(country).await
    }

    async fn save(&self, country: &str, domains: &SeenDomainSet) -> Result<()> {
        (**self).save(country, domains).await
    }
}
