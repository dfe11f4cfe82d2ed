//! Cross-run duplicate filter.
//!
//! Two tiers of state:
//!
//! - the persisted set, shared across runs through a [`SeenDomainStore`];
//! - the working set, loaded from the persisted set at start and grown as
//!   the run admits new domains.
//!
//! `test_and_insert` only touches the working set. `flush` re-reads the
//! persisted set and writes back the union, so domains saved by an
//! overlapping run in the meantime are kept. A crash before `flush` loses
//! this run's additions but never damages the persisted baseline.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::filter::DomainFilter;
use crate::traits::store::{SeenDomainSet, SeenDomainStore};

struct WorkingSet {
    domains: SeenDomainSet,
    /// Domains inserted since load, in insertion order.
    additions: Vec<String>,
}

/// Per-country duplicate filter owning the run's working set.
pub struct DuplicateFilter {
    country: String,
    store: Arc<dyn SeenDomainStore>,
    working: Mutex<WorkingSet>,
}

impl DuplicateFilter {
    /// Load the persisted set for `country`, creating an empty one if absent.
    ///
    /// Fails with a storage error if the state exists but cannot be read,
    /// or if the initial empty set cannot be written.
    pub async fn load(store: Arc<dyn SeenDomainStore>, country: &str) -> Result<Self> {
        let domains = match store.load(country).await? {
            Some(domains) => domains,
            None => {
                let empty = SeenDomainSet::new();
                store.save(country, &empty).await?;
                info!(country, "Initialized empty seen-domain set");
                empty
            }
        };

        info!(country, seen = domains.len(), "Loaded seen-domain set");

        Ok(Self {
            country: country.to_string(),
            store,
            working: Mutex::new(WorkingSet {
                domains,
                additions: Vec::new(),
            }),
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Record `domain` and report whether it was new.
    ///
    /// The check and the insert happen under one lock, so concurrent calls
    /// for the same domain see exactly one `true`.
    pub async fn test_and_insert(&self, domain: &str) -> bool {
        let mut working = self.working.lock().await;
        let is_new = working.domains.insert(domain.to_string());
        if is_new {
            working.additions.push(domain.to_string());
        }
        is_new
    }

    /// Whether the working set already holds `domain`.
    pub async fn contains(&self, domain: &str) -> bool {
        self.working.lock().await.domains.contains(domain)
    }

    /// Size of the working set (persisted baseline plus additions).
    pub async fn len(&self) -> usize {
        self.working.lock().await.domains.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Domains first seen during this run, in insertion order.
    pub async fn additions(&self) -> Vec<String> {
        self.working.lock().await.additions.clone()
    }

    /// Merge the working set into the persisted set.
    ///
    /// Re-reads the persisted state, unions it with the working set and
    /// saves the union. Returns the persisted size. The lock is held for the
    /// whole read-merge-write so in-run inserts cannot slip between the
    /// snapshot and the save.
    pub async fn flush(&self) -> Result<usize> {
        let working = self.working.lock().await;

        let mut merged = self.store.load(&self.country).await?.unwrap_or_default();
        let before = merged.len();
        merged.extend(working.domains.iter().cloned());

        self.store.save(&self.country, &merged).await?;

        info!(
            country = %self.country,
            persisted_before = before,
            persisted_after = merged.len(),
            added_this_run = working.additions.len(),
            "Flushed seen-domain set"
        );
        Ok(merged.len())
    }
}

#[async_trait]
impl DomainFilter for DuplicateFilter {
    async fn admit(&self, domain: &str) -> bool {
        let is_new = self.test_and_insert(domain).await;
        if !is_new {
            debug!(domain, "Dropping previously seen domain");
        }
        is_new
    }
}
