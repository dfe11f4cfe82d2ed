//! Domain filters applied by the search client.

pub mod duplicate;

pub use duplicate::DuplicateFilter;
