//! Aggregator: runs the search client over every city of a query plan.
//!
//! Cities may be processed concurrently, but the bundle always lists them in
//! plan order. Queries within a city run one after another so that the
//! intra-city dedup sees earlier queries' results. A failing query is
//! recorded and the run moves on; the seen-domain set is flushed once at
//! the end.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::filters::DuplicateFilter;
use crate::pipeline::search::SearchClient;
use crate::security::redact_url;
use crate::traits::transport::SearchTransport;
use crate::types::country::QueryPlan;
use crate::types::results::{CityResultSet, QueryFailure, QueryStats, ResultBundle, RunReport};

struct CityOutcome {
    results: CityResultSet,
    failures: Vec<QueryFailure>,
    stats: QueryStats,
}

/// Orchestrates one country run.
pub struct Aggregator<T: SearchTransport> {
    client: SearchClient<T>,
    filter: Arc<DuplicateFilter>,
    city_concurrency: usize,
}

impl<T: SearchTransport> Aggregator<T> {
    /// Create an aggregator. `filter` is appended to the client's filter
    /// chain and flushed at the end of every run.
    pub fn new(client: SearchClient<T>, filter: Arc<DuplicateFilter>) -> Self {
        let client = client.with_filter(filter.clone());
        Self {
            client,
            filter,
            city_concurrency: 1,
        }
    }

    /// Process up to `concurrency` cities at once.
    pub fn with_city_concurrency(mut self, concurrency: usize) -> Self {
        self.city_concurrency = concurrency.max(1);
        self
    }

    pub fn client(&self) -> &SearchClient<T> {
        &self.client
    }

    pub fn filter(&self) -> &Arc<DuplicateFilter> {
        &self.filter
    }

    /// Run every query of the plan and flush the seen-domain set.
    pub async fn run(&self, plan: &QueryPlan) -> RunReport {
        let started_at = Utc::now();
        let country = self.filter.country().to_string();
        info!(
            country = %country,
            cities = plan.len(),
            queries = plan.values().map(Vec::len).sum::<usize>(),
            concurrency = self.city_concurrency,
            "Starting harvest run"
        );

        let outcomes: Vec<CityOutcome> = stream::iter(plan.iter())
            .map(|(city, urls)| self.collect_city(city, urls))
            .buffered(self.city_concurrency)
            .collect()
            .await;

        let mut cities = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        let mut stats = QueryStats::default();
        for outcome in outcomes {
            cities.push(outcome.results);
            failures.extend(outcome.failures);
            stats.absorb(outcome.stats);
        }

        let flush_warning = match self.filter.flush().await {
            Ok(_) => None,
            Err(e) => {
                warn!(country = %country, error = %e, "Failed to persist seen domains; results kept");
                Some(e.to_string())
            }
        };

        let bundle = ResultBundle::new(cities);
        info!(
            country = %country,
            results = bundle.total_results(),
            failed_queries = failures.len(),
            raw_items = stats.raw_items,
            "Harvest run complete"
        );

        RunReport {
            country,
            started_at,
            finished_at: Utc::now(),
            bundle,
            failures,
            flush_warning,
            stats,
        }
    }

    async fn collect_city(&self, city: &str, urls: &[String]) -> CityOutcome {
        let mut results = CityResultSet::new(city);
        let mut failures = Vec::new();
        let mut stats = QueryStats::default();

        for url in urls {
            match self.client.collect_for_query(url, &mut results).await {
                Ok(query_stats) => stats.absorb(query_stats),
                Err(e) => {
                    let query_url = redact_url(url);
                    warn!(city, url = %query_url, error = %e, "Query failed, continuing");
                    failures.push(QueryFailure {
                        city: city.to_string(),
                        query_url,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(city, results = results.len(), failed = failures.len(), "City complete");
        CityOutcome {
            results,
            failures,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{numbered_page, organic_page, MemorySeenStore, MockTransport};
    use crate::types::config::RetryPolicy;
    use std::time::Duration;

    async fn aggregator(
        mock: &MockTransport,
        store: &MemorySeenStore,
    ) -> Aggregator<MockTransport> {
        let filter = DuplicateFilter::load(Arc::new(store.clone()), "Ireland")
            .await
            .unwrap();
        let client = SearchClient::new(mock.clone(), "tester").with_retry(RetryPolicy::none());
        Aggregator::new(client, Arc::new(filter))
    }

    fn plan(entries: &[(&str, &[&str])]) -> QueryPlan {
        entries
            .iter()
            .map(|(city, urls)| {
                (
                    city.to_string(),
                    urls.iter().map(|u| u.to_string()).collect(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_intra_city_dedup_across_queries() {
        let mock = MockTransport::new()
            .with_body("https://search.test/q1", organic_page(["https://example.com/page"]))
            .with_body(
                "https://search.test/q2",
                organic_page(["https://example.com/page", "https://new.ie/"]),
            );
        let store = MemorySeenStore::new();
        let agg = aggregator(&mock, &store).await;

        let report = agg
            .run(&plan(&[(
                "Dublin",
                &["https://search.test/q1", "https://search.test/q2"],
            )]))
            .await;

        let dublin = report.bundle.city("Dublin").unwrap();
        assert_eq!(dublin.domains().collect::<Vec<_>>(), ["example.com", "new.ie"]);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_domain_seen_in_earlier_city_is_dropped() {
        let mock = MockTransport::new()
            .with_body("https://search.test/dublin", organic_page(["https://shared.ie/"]))
            .with_body(
                "https://search.test/cork",
                organic_page(["https://shared.ie/", "https://cork.ie/"]),
            );
        let store = MemorySeenStore::new();
        let agg = aggregator(&mock, &store).await;

        let report = agg
            .run(&plan(&[
                ("Dublin", &["https://search.test/dublin"]),
                ("Cork", &["https://search.test/cork"]),
            ]))
            .await;

        assert_eq!(report.bundle.city("Dublin").unwrap().len(), 1);
        assert_eq!(
            report.bundle.city("Cork").unwrap().domains().collect::<Vec<_>>(),
            ["cork.ie"]
        );
    }

    #[tokio::test]
    async fn test_order_preserved_when_later_city_finishes_first() {
        let mock = MockTransport::new()
            .with_body("https://search.test/a", numbered_page("a", 0, 2))
            .with_delay("https://search.test/a", Duration::from_millis(100))
            .with_body("https://search.test/b", numbered_page("b", 0, 2));
        let store = MemorySeenStore::new();
        let agg = aggregator(&mock, &store).await.with_city_concurrency(2);

        let report = agg
            .run(&plan(&[
                ("A", &["https://search.test/a"]),
                ("B", &["https://search.test/b"]),
            ]))
            .await;

        // B's request was issued while A was still waiting.
        assert_eq!(mock.calls()[1], "https://search.test/b");
        assert_eq!(report.bundle.city_names(), ["A", "B"]);
        assert_eq!(report.bundle.total_results(), 4);
    }

    #[tokio::test]
    async fn test_failed_query_is_reported_and_run_continues() {
        let mock = MockTransport::new()
            .with_body("https://search.test/ok?api_key=k", numbered_page("ie", 0, 3))
            .fail_times("https://search.test/broken?api_key=k", 1, Some(500));
        let store = MemorySeenStore::new();
        let agg = aggregator(&mock, &store).await;

        let report = agg
            .run(&plan(&[
                ("Dublin", &["https://search.test/broken?api_key=k"]),
                ("Cork", &["https://search.test/ok?api_key=k"]),
            ]))
            .await;

        assert_eq!(report.bundle.city_names(), ["Dublin", "Cork"]);
        assert!(report.bundle.city("Dublin").unwrap().is_empty());
        assert_eq!(report.bundle.city("Cork").unwrap().len(), 3);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].city, "Dublin");
        assert!(report.failures[0].query_url.contains("api_key=REDACTED"));
        assert!(!report.is_complete());

        // Successful domains were still persisted.
        assert_eq!(store.domains("Ireland").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_flush_failure_keeps_bundle() {
        let mock = MockTransport::new()
            .with_body("https://search.test/q", numbered_page("ie", 0, 5));
        let store = MemorySeenStore::new();
        let agg = aggregator(&mock, &store).await;
        store.fail_saves(true);

        let report = agg
            .run(&plan(&[("Dublin", &["https://search.test/q"])]))
            .await;

        assert_eq!(report.bundle.total_results(), 5);
        assert!(report.flush_warning.is_some());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_empty_plan_still_flushes() {
        let mock = MockTransport::new();
        let store = MemorySeenStore::new();
        let agg = aggregator(&mock, &store).await;

        let report = agg.run(&QueryPlan::new()).await;
        assert!(report.bundle.cities.is_empty());
        // Initial empty save plus the flush.
        assert_eq!(store.save_count(), 2);
    }
}
