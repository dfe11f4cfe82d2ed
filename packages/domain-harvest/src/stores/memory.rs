//! In-memory seen-domain storage for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{HarvestError, Result};
use crate::traits::store::{SeenDomainSet, SeenDomainStore};

/// In-memory seen-domain store.
///
/// Clones share state, so a test can hand one clone to the pipeline and
/// inspect another. Loads and saves can be made to fail to exercise the
/// storage error paths.
#[derive(Clone, Default)]
pub struct MemorySeenStore {
    sets: Arc<RwLock<HashMap<String, SeenDomainSet>>>,
    fail_loads: Arc<RwLock<bool>>,
    fail_saves: Arc<RwLock<bool>>,
    saves: Arc<RwLock<usize>>,
}

impl MemorySeenStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a country's persisted set.
    pub fn with_domains(self, country: &str, domains: &[&str]) -> Self {
        self.insert(country, domains);
        self
    }

    /// Add domains to the persisted set, as a concurrent run would.
    pub fn insert(&self, country: &str, domains: &[&str]) {
        self.sets
            .write()
            .unwrap()
            .entry(country.to_string())
            .or_default()
            .extend(domains.iter().map(|d| d.to_string()));
    }

    /// Make every subsequent load fail.
    pub fn fail_loads(&self, fail: bool) {
        *self.fail_loads.write().unwrap() = fail;
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(&self, fail: bool) {
        *self.fail_saves.write().unwrap() = fail;
    }

    /// Current persisted set for a country.
    pub fn domains(&self, country: &str) -> Option<SeenDomainSet> {
        self.sets.read().unwrap().get(country).cloned()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap()
    }
}

fn memory_path(country: &str) -> PathBuf {
    PathBuf::from(format!("memory://{}", country))
}

#[async_trait]
impl SeenDomainStore for MemorySeenStore {
    async fn load(&self, country: &str) -> Result<Option<SeenDomainSet>> {
        if *self.fail_loads.read().unwrap() {
            return Err(HarvestError::storage(
                memory_path(country),
                "simulated read failure",
            ));
        }
        Ok(self.domains(country))
    }

    async fn save(&self, country: &str, domains: &SeenDomainSet) -> Result<()> {
        if *self.fail_saves.read().unwrap() {
            return Err(HarvestError::storage(
                memory_path(country),
                "simulated write failure",
            ));
        }
        self.sets
            .write()
            .unwrap()
            .insert(country.to_string(), domains.clone());
        *self.saves.write().unwrap() += 1;
        Ok(())
    }
}
