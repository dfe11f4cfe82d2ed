//! Result sink implementations.
//!
//! - `JsonFileSink` - one JSON file per city under a results directory
//! - `MemorySink` - keeps bundles in memory, for tests

pub mod json;
pub mod memory;

pub use json::JsonFileSink;
pub use memory::MemorySink;

use std::collections::HashSet;

use crate::types::results::{CityResultSet, DomainResult};

/// Results of `city` not yet in `recorded`, and how many were skipped.
///
/// `recorded` is left untouched; callers add the fresh domains only once
/// they are safely stored.
pub(crate) fn unrecorded<'a>(
    city: &'a CityResultSet,
    recorded: &HashSet<String>,
) -> (Vec<&'a DomainResult>, usize) {
    let (fresh, seen): (Vec<_>, Vec<_>) = city
        .results()
        .iter()
        .partition(|result| !recorded.contains(result.domain()));
    (fresh, seen.len())
}
