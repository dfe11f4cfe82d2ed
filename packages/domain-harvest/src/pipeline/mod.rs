//! The harvesting pipeline.
//!
//! ```text
//! QueryBuilder ──► QueryPlan ──► Aggregator ──► RunReport ──► ResultSink
//!                                   │
//!                                   ▼
//!                              SearchClient ──► SearchTransport
//!                                   │
//!                                   ▼
//!                             DuplicateFilter ──► SeenDomainStore
//! ```

pub mod aggregate;
pub mod query;
pub mod search;

pub use aggregate::Aggregator;
pub use query::QueryBuilder;
pub use search::{page_url, FetchedPage, SearchClient};
