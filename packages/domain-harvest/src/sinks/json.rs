//! JSON file sink.
//!
//! Writes `<root>/<country_slug>/<city_slug>-<YYYY-MM-DD-HH-MM>.json` per
//! city, each holding a 1-based object of results:
//!
//! ```json
//! {"1": {"domain": "...", "link": "...", "title": "...", "snippet": "...", "searcher": "..."}}
//! ```

use async_trait::async_trait;
use chrono::Local;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::error::{HarvestError, Result};
use crate::sinks::unrecorded;
use crate::traits::sink::ResultSink;
use crate::types::country::slug;
use crate::types::results::{ResultBundle, SinkReport};

/// Sink writing per-city JSON files.
///
/// Domains written once by this sink are skipped in later bundles.
pub struct JsonFileSink {
    root: PathBuf,
    recorded: Mutex<HashSet<String>>,
}

impl JsonFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recorded: Mutex::new(HashSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    async fn write(&self, country: &str, bundle: &ResultBundle) -> Result<SinkReport> {
        let dir = self.root.join(slug(country));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| HarvestError::Sink(Box::new(e)))?;

        let timestamp = Local::now().format("%Y-%m-%d-%H-%M").to_string();
        let mut report = SinkReport::default();

        for city in &bundle.cities {
            let (body, domains) = {
                let recorded = self
                    .recorded
                    .lock()
                    .map_err(|_| HarvestError::Sink("sink state poisoned".into()))?;
                let (fresh, skipped) = unrecorded(city, &recorded);
                report.skipped += skipped;

                let domains: Vec<String> = fresh.iter().map(|r| r.domain().to_string()).collect();
                let numbered: IndexMap<String, _> = fresh
                    .into_iter()
                    .enumerate()
                    .map(|(i, result)| ((i + 1).to_string(), result))
                    .collect();
                let body =
                    serde_json::to_vec(&numbered).map_err(|e| HarvestError::Sink(Box::new(e)))?;
                (body, domains)
            };

            let path = dir.join(format!("{}-{}.json", slug(&city.city_name), timestamp));
            tokio::fs::write(&path, body)
                .await
                .map_err(|e| HarvestError::Sink(Box::new(e)))?;

            report.written += domains.len();
            self.recorded
                .lock()
                .map_err(|_| HarvestError::Sink("sink state poisoned".into()))?
                .extend(domains);
        }

        info!(
            country,
            dir = %dir.display(),
            written = report.written,
            skipped = report.skipped,
            "Wrote result files"
        );
        Ok(report)
    }
}
