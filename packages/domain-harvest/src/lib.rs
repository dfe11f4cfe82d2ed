//! Paginated, deduplicated search result harvesting.
//!
//! Given a country and a set of city names, builds search queries, runs them
//! against a paginated search API, drops domains already delivered in
//! earlier runs, and assembles per-city result sets for a sink.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_harvest::{
//!     Aggregator, DuplicateFilter, FileSeenStore, HttpTransport, QueryBuilder, SearchClient,
//!     TransportExt,
//! };
//!
//! let plan = QueryBuilder::new(settings, api_key).build_queries(["Dublin", "Cork"])?;
//!
//! let filter = DuplicateFilter::load(Arc::new(FileSeenStore::new(".")), "Ireland").await?;
//! let transport = HttpTransport::new(Duration::from_secs(30))?.rate_limited(5);
//! let client = SearchClient::new(transport, "Hanna Y");
//!
//! let report = Aggregator::new(client, Arc::new(filter)).run(&plan).await;
//! sink.write("Ireland", &report.bundle).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for transport, storage, filtering and sinks
//! - [`types`] - Results, configuration and country settings
//! - [`pipeline`] - Search client, aggregator and query builder
//! - [`filters`] - The cross-run duplicate filter
//! - [`stores`] - Seen-domain storage backends
//! - [`transports`] - HTTP and rate-limited transports
//! - [`sinks`] - Result sinks
//! - [`testing`] - Mock implementations for testing

pub mod domain;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod security;
pub mod sinks;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod transports;
pub mod types;

// Re-export core types at crate root
pub use domain::extract_domain;
pub use error::{HarvestError, Result};
pub use filters::DuplicateFilter;
pub use pipeline::{page_url, Aggregator, FetchedPage, QueryBuilder, SearchClient};
pub use security::{redact_url, SecretString};
pub use sinks::{JsonFileSink, MemorySink};
pub use stores::{FileSeenStore, MemorySeenStore};
pub use traits::{
    filter::DomainFilter,
    sink::ResultSink,
    store::{SeenDomainSet, SeenDomainStore},
    transport::SearchTransport,
};
pub use transports::{HttpTransport, RateLimitedTransport, TransportExt};
pub use types::{
    config::{HarvestConfig, RetryPolicy},
    country::{slug, CountryCatalog, CountrySettings, QueryPlan},
    results::{
        CityResultSet, DomainResult, QueryFailure, QueryStats, ResultBundle, RunReport,
        SinkReport,
    },
};
