//! Integration tests for full harvest runs.
//!
//! These drive the pipeline end to end against a mock transport:
//! 1. Build the query plan from country settings
//! 2. Load seen-domain state from disk
//! 3. Aggregate across cities with pagination and dedup
//! 4. Flush state and hand the bundle to a sink

use std::sync::Arc;

use domain_harvest::{
    page_url,
    testing::{numbered_page, organic_page, MemorySink, MockTransport},
    Aggregator, CountryCatalog, DuplicateFilter, FileSeenStore, HarvestError, QueryBuilder,
    QueryPlan, ResultSink, RetryPolicy, RunReport, SearchClient, SecretString,
};

const COUNTRIES: &str = r#"{
    "Ireland": {
        "name": "Ireland",
        "lang": "en",
        "suf": "ie",
        "queries": ["cafes in {}"]
    }
}"#;

fn plan_for(cities: &[&str]) -> QueryPlan {
    let catalog = CountryCatalog::from_json(COUNTRIES).unwrap();
    let settings = catalog.settings("Ireland").unwrap().clone();
    QueryBuilder::new(settings, SecretString::new("test-key"))
        .with_endpoint("https://search.test/search")
        .build_queries(cities)
        .unwrap()
}

/// Run one full pipeline pass against on-disk state in `state_dir`.
async fn run_once(
    state_dir: &std::path::Path,
    mock: &MockTransport,
    plan: &QueryPlan,
) -> RunReport {
    let store = Arc::new(FileSeenStore::new(state_dir));
    let filter = DuplicateFilter::load(store, "Ireland").await.unwrap();
    let client = SearchClient::new(mock.clone(), "integration").with_retry(RetryPolicy::none());
    Aggregator::new(client, Arc::new(filter)).run(plan).await
}

#[tokio::test]
async fn test_second_run_yields_nothing_new() {
    let state = tempfile::tempdir().unwrap();
    let plan = plan_for(&["Dublin"]);
    let url = &plan["Dublin"][0];
    let mock = MockTransport::new().with_body(
        url.clone(),
        organic_page([
            "https://www.brewbar.ie/",
            "https://beanery.com/menu",
            "https://www.brewbar.ie/about",
        ]),
    );

    let first = run_once(state.path(), &mock, &plan).await;
    assert!(first.is_complete());
    assert_eq!(
        first.bundle.city("Dublin").unwrap().domains().collect::<Vec<_>>(),
        ["brewbar.ie", "beanery.com"]
    );

    let second = run_once(state.path(), &mock, &plan).await;
    assert!(second.is_complete());
    assert_eq!(second.bundle.city_names(), ["Dublin"]);
    assert!(second.bundle.is_empty());

    let on_disk: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(state.path().join("ireland/seen_domains.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(on_disk["domains"], serde_json::json!(["beanery.com", "brewbar.ie"]));
}

#[tokio::test]
async fn test_paginated_cities_in_input_order() {
    let state = tempfile::tempdir().unwrap();
    let plan = plan_for(&["Galway", "Cork"]);
    let galway = plan["Galway"][0].clone();
    let cork = plan["Cork"][0].clone();

    let mock = MockTransport::new()
        .with_body(galway.clone(), numbered_page("ie", 0, 100))
        .with_body(page_url(&galway, 100).unwrap(), numbered_page("ie", 100, 100))
        .with_body(page_url(&galway, 200).unwrap(), numbered_page("ie", 200, 40))
        .with_body(cork.clone(), numbered_page("com", 0, 10));

    let report = run_once(state.path(), &mock, &plan).await;

    assert_eq!(report.bundle.city_names(), ["Galway", "Cork"]);
    assert_eq!(report.bundle.city("Galway").unwrap().len(), 240);
    assert_eq!(report.bundle.city("Cork").unwrap().len(), 10);
    assert_eq!(report.stats.pages, 4);
    assert_eq!(report.stats.raw_items, 250);
    assert_eq!(mock.calls().len(), 4);
}

#[tokio::test]
async fn test_corrupt_state_aborts_before_any_request() {
    let state = tempfile::tempdir().unwrap();
    let path = state.path().join("ireland");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("seen_domains.json"), "{ definitely not state").unwrap();

    let store = Arc::new(FileSeenStore::new(state.path()));
    let result = DuplicateFilter::load(store, "Ireland").await;
    assert!(matches!(result, Err(HarvestError::Storage { .. })));
}

#[tokio::test]
async fn test_bundle_reaches_sink() {
    let state = tempfile::tempdir().unwrap();
    let plan = plan_for(&["Dublin", "Cork"]);
    let mock = MockTransport::new()
        .with_body(plan["Dublin"][0].clone(), numbered_page("ie", 0, 3))
        .with_body(plan["Cork"][0].clone(), numbered_page("ie", 3, 2));

    let report = run_once(state.path(), &mock, &plan).await;

    let sink = MemorySink::new();
    let written = sink.write("Ireland", &report.bundle).await.unwrap();
    assert_eq!(written.written, 5);
    assert_eq!(written.skipped, 0);

    let stored = sink.written();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, "Ireland");
    assert_eq!(stored[0].1, report.bundle);
}
