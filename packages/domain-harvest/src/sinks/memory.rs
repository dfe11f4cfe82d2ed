//! In-memory sink for tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::error::{HarvestError, Result};
use crate::sinks::unrecorded;
use crate::traits::sink::ResultSink;
use crate::types::results::{CityResultSet, ResultBundle, SinkReport};

/// Sink that keeps what it was given.
///
/// Stores, per write, the bundle reduced to not-yet-recorded results.
/// Clones share state.
#[derive(Clone, Default)]
pub struct MemorySink {
    written: Arc<RwLock<Vec<(String, ResultBundle)>>>,
    recorded: Arc<RwLock<HashSet<String>>>,
    fail: Arc<RwLock<bool>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail.write().unwrap() = fail;
    }

    /// Bundles written so far, with the country they were written for.
    pub fn written(&self) -> Vec<(String, ResultBundle)> {
        self.written.read().unwrap().clone()
    }

    pub fn recorded_count(&self) -> usize {
        self.recorded.read().unwrap().len()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn write(&self, country: &str, bundle: &ResultBundle) -> Result<SinkReport> {
        if *self.fail.read().unwrap() {
            return Err(HarvestError::Sink("simulated sink failure".into()));
        }

        let mut recorded = self.recorded.write().unwrap();
        let mut report = SinkReport::default();
        let mut kept = Vec::with_capacity(bundle.cities.len());

        for city in &bundle.cities {
            let (fresh, skipped) = unrecorded(city, &recorded);
            report.written += fresh.len();
            report.skipped += skipped;

            let mut set = CityResultSet::new(city.city_name.clone());
            for result in fresh {
                recorded.insert(result.domain().to_string());
                set.push_unique(result.clone());
            }
            kept.push(set);
        }

        self.written
            .write()
            .unwrap()
            .push((country.to_string(), ResultBundle::new(kept)));
        Ok(report)
    }
}
