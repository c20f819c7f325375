//! City search used by the sidebar to pick a location.

use crate::{
    core::{config::DashboardConfig, dashboard::SelectedLocation, geo::LatLng},
    feed::source::{get_json, HTTP_CLIENT},
    prelude::{Duration, Instant},
    search::cache::QueryCache,
    Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One match from `/api/cities/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySearchResult {
    pub place_name: String,
    pub coordinates: LatLng,
}

impl CitySearchResult {
    pub fn to_location(&self) -> SelectedLocation {
        SelectedLocation::new(self.coordinates, self.place_name.clone())
    }
}

#[async_trait]
pub trait CityLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Vec<CitySearchResult>>;
}

/// `GET {base}/api/cities/search?q=`
#[derive(Debug, Clone)]
pub struct HttpCityLookup {
    endpoint: String,
    timeout: Duration,
}

impl HttpCityLookup {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/cities/search", base_url.trim_end_matches('/')),
            timeout: Duration::from_millis(crate::constants::FEED_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.api_base()).with_timeout(config.feed.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CityLookup for HttpCityLookup {
    async fn lookup(&self, query: &str) -> Result<Vec<CitySearchResult>> {
        let request = HTTP_CLIENT
            .get(&self.endpoint)
            .query(&[("q", query)])
            .timeout(self.timeout);
        get_json(request, &self.endpoint).await
    }
}

/// Caching front for a [`CityLookup`]
pub struct CitySearch<L> {
    lookup: L,
    cache: QueryCache<Vec<CitySearchResult>>,
    min_query_len: usize,
}

impl<L: CityLookup> CitySearch<L> {
    pub fn new(lookup: L, config: &crate::core::config::SearchConfig) -> Self {
        Self {
            lookup,
            cache: QueryCache::new(config.cache_capacity, config.cache_ttl()),
            min_query_len: config.min_query_len,
        }
    }

    pub fn with_defaults(lookup: L) -> Self {
        Self::new(lookup, &Default::default())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CitySearchResult>> {
        self.search_at(query, Instant::now()).await
    }

    /// Short queries return nothing without a request. Successful results are
    /// cached per query string; failures are not.
    pub async fn search_at(&self, query: &str, now: Instant) -> Result<Vec<CitySearchResult>> {
        if query.chars().count() < self.min_query_len {
            return Ok(Vec::new());
        }
        if let Some(hit) = self.cache.get(query, now) {
            log::debug!("city search cache hit for '{}'", query);
            return Ok(hit);
        }
        let results = self.lookup.lookup(query).await?;
        self.cache.insert(query, results.clone(), now);
        Ok(results)
    }

    pub fn cache(&self) -> &QueryCache<Vec<CitySearchResult>> {
        &self.cache
    }
}
