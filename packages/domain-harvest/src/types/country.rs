//! Country settings and the resolved query plan.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Ordered mapping from city name to its query URLs.
pub type QueryPlan = IndexMap<String, Vec<String>>;

/// Search settings for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySettings {
    /// Location name passed to the search API.
    pub name: String,

    /// Interface language code (`hl`).
    pub lang: String,

    /// Country suffix code (`gl`).
    pub suf: String,

    /// Query templates; `{}` is replaced by the city name.
    #[serde(default)]
    pub queries: Vec<String>,
}

/// All configured countries, keyed by the name used on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCatalog {
    countries: HashMap<String, CountrySettings>,
}

impl CountryCatalog {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| HarvestError::Config(format!("invalid country settings: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Config(format!(
                "cannot read country settings {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Look up a country's settings.
    pub fn settings(&self, country: &str) -> Result<&CountrySettings> {
        self.countries
            .get(country)
            .ok_or_else(|| HarvestError::Config(format!("country '{}' not configured", country)))
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }
}

/// Filesystem-friendly form of a name, safe to use as one path segment.
///
/// Lowercased; anything but letters, digits, `-` and `_` becomes `_`.
/// Never empty.
pub fn slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "_".to_string()
    } else {
        slug
    }
}
