//! Result data model: per-domain hits, per-city sets, run bundles and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One search hit, keyed by its bare domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainResult {
    domain: String,
    link: String,
    title: String,
    snippet: String,
    /// Which searcher/session produced the hit.
    #[serde(rename = "searcher")]
    source_label: String,
}

impl DomainResult {
    pub fn new(
        domain: impl Into<String>,
        link: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            link: link.into(),
            title: title.into(),
            snippet: snippet.into(),
            source_label: source_label.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }
}

/// Results for one city. No two entries share a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CityResultSetRecord")]
pub struct CityResultSet {
    pub city_name: String,
    results: Vec<DomainResult>,
    #[serde(skip)]
    domains: HashSet<String>,
}

#[derive(Deserialize)]
struct CityResultSetRecord {
    city_name: String,
    results: Vec<DomainResult>,
}

impl From<CityResultSetRecord> for CityResultSet {
    fn from(record: CityResultSetRecord) -> Self {
        let mut set = CityResultSet::new(record.city_name);
        for result in record.results {
            set.push_unique(result);
        }
        set
    }
}

impl CityResultSet {
    pub fn new(city_name: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            results: Vec::new(),
            domains: HashSet::new(),
        }
    }

    pub fn results(&self) -> &[DomainResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Append a result unless its domain is already present.
    ///
    /// Returns whether the result was appended.
    pub fn push_unique(&mut self, result: DomainResult) -> bool {
        if !self.domains.insert(result.domain.clone()) {
            return false;
        }
        self.results.push(result);
        true
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.domain.as_str())
    }
}

/// Complete output of one run, one entry per requested city in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub cities: Vec<CityResultSet>,
}

impl ResultBundle {
    pub fn new(cities: Vec<CityResultSet>) -> Self {
        Self { cities }
    }

    pub fn city(&self, name: &str) -> Option<&CityResultSet> {
        self.cities.iter().find(|c| c.city_name == name)
    }

    pub fn city_names(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.city_name.as_str()).collect()
    }

    /// Total results across all cities.
    pub fn total_results(&self) -> usize {
        self.cities.iter().map(CityResultSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_results() == 0
    }
}

/// Counters for one query URL's pagination loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Pages fetched successfully.
    pub pages: usize,
    /// Organic items seen before any dedup.
    pub raw_items: usize,
    /// Items appended to the city set.
    pub kept: usize,
}

impl QueryStats {
    pub fn absorb(&mut self, other: QueryStats) {
        self.pages += other.pages;
        self.raw_items += other.raw_items;
        self.kept += other.kept;
    }
}

/// A (city, query) pair that failed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub city: String,
    /// Query URL with secrets redacted.
    pub query_url: String,
    pub error: String,
}

/// Outcome of one aggregation run.
///
/// The bundle is always present, even when some queries failed or the
/// seen-domain state could not be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub country: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub bundle: ResultBundle,
    pub failures: Vec<QueryFailure>,
    /// Set when the seen-domain flush failed; results are still usable.
    pub flush_warning: Option<String>,
    pub stats: QueryStats,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.flush_warning.is_none()
    }
}

/// What a sink did with a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReport {
    pub written: usize,
    /// Entries the sink had already recorded.
    pub skipped: usize,
}
