//! Query plan construction from country settings.

use url::Url;

use crate::error::{HarvestError, Result};
use crate::security::SecretString;
use crate::types::config::{DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE};
use crate::types::country::{CountrySettings, QueryPlan};

/// Placeholder in query templates replaced by the city name.
const CITY_PLACEHOLDER: &str = "{}";

/// Builds fully parameterized query URLs for a country's cities.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    settings: CountrySettings,
    api_key: SecretString,
    endpoint: String,
    page_size: usize,
}

impl QueryBuilder {
    pub fn new(settings: CountrySettings, api_key: SecretString) -> Self {
        Self {
            settings,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// One entry per distinct city, in input order, each with one URL per
    /// query template.
    pub fn build_queries<I, S>(&self, cities: I) -> Result<QueryPlan>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plan = QueryPlan::new();
        for city in cities {
            let city = city.as_ref().trim();
            if city.is_empty() || plan.contains_key(city) {
                continue;
            }

            let urls = self
                .settings
                .queries
                .iter()
                .map(|template| self.query_url(template, city))
                .collect::<Result<Vec<_>>>()?;
            plan.insert(city.to_string(), urls);
        }
        Ok(plan)
    }

    fn query_url(&self, template: &str, city: &str) -> Result<String> {
        let query = template.replace(CITY_PLACEHOLDER, city);
        let page_size = self.page_size.to_string();

        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", query.as_str()),
                ("location", self.settings.name.as_str()),
                ("hl", self.settings.lang.as_str()),
                ("gl", self.settings.suf.as_str()),
                ("api_key", self.api_key.expose()),
                ("num", page_size.as_str()),
            ],
        )
        .map_err(|e| HarvestError::Config(format!("invalid search endpoint: {}", e)))?;
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ireland() -> CountrySettings {
        CountrySettings {
            name: "Ireland".into(),
            lang: "en".into(),
            suf: "ie".into(),
            queries: vec!["coffee shops in {}".into(), "{} bakeries".into()],
        }
    }

    #[test]
    fn test_builds_one_url_per_template() {
        let builder = QueryBuilder::new(ireland(), SecretString::new("key123"));
        let plan = builder.build_queries(["Dublin", "New Ross"]).unwrap();

        assert_eq!(plan.keys().collect::<Vec<_>>(), ["Dublin", "New Ross"]);
        let urls = &plan["New Ross"];
        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[0],
            "https://serpapi.com/search?q=coffee+shops+in+New+Ross&location=Ireland&hl=en&gl=ie&api_key=key123&num=100"
        );
        assert!(urls[1].contains("q=New+Ross+bakeries"));
    }

    #[test]
    fn test_duplicate_and_blank_cities_collapse() {
        let builder = QueryBuilder::new(ireland(), SecretString::new("k"));
        let plan = builder.build_queries(["Cork", " ", "Dublin", "Cork"]).unwrap();
        assert_eq!(plan.keys().collect::<Vec<_>>(), ["Cork", "Dublin"]);
    }

    #[test]
    fn test_custom_endpoint_and_page_size() {
        let builder = QueryBuilder::new(ireland(), SecretString::new("k"))
            .with_endpoint("http://localhost:8080/search")
            .with_page_size(20);
        let plan = builder.build_queries(["Galway"]).unwrap();
        assert!(plan["Galway"][0].starts_with("http://localhost:8080/search?"));
        assert!(plan["Galway"][0].ends_with("num=20"));
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let builder =
            QueryBuilder::new(ireland(), SecretString::new("k")).with_endpoint("::not a url");
        assert!(matches!(
            builder.build_queries(["Galway"]),
            Err(HarvestError::Config(_))
        ));
    }
}
