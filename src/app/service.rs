//! High-level indicator operations
//!
//! `IndicatorService` wires the client, the paged fetcher, and the
//! cache gateway together. It is constructed once per process and
//! cloned into callers; all fields are cheap to clone and internally
//! shared. The gateway is an explicit dependency here rather than a
//! process-wide singleton, so alternative backends (and test fakes)
//! drop in without global state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::FetchResult;
use crate::app::aggregate;
use crate::app::cache::{CacheGateway, DistributedCache};
use crate::app::client::WdiClient;
use crate::app::coordinator;
use crate::app::fetcher::{PagedFetcher, PageRequest};
use crate::app::models::{CacheKey, CountryJoin, Indicator};

/// Cached, concurrent access to aggregated indicators
pub struct IndicatorService<B: DistributedCache> {
    client: Arc<WdiClient>,
    fetcher: PagedFetcher<WdiClient>,
    gateway: CacheGateway<B>,
    default_ttl: Duration,
}

impl<B: DistributedCache + Clone> Clone for IndicatorService<B> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            fetcher: self.fetcher.clone(),
            gateway: self.gateway.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

impl<B> IndicatorService<B>
where
    B: DistributedCache + Clone + 'static,
{
    /// Create a service over a shared client and cache gateway
    pub fn new(client: Arc<WdiClient>, gateway: CacheGateway<B>, default_ttl: Duration) -> Self {
        let fetcher = PagedFetcher::new(Arc::clone(&client));
        Self {
            client,
            fetcher,
            gateway,
            default_ttl,
        }
    }

    /// Default TTL applied to cached results
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Aggregated info + time-series for one country/indicator pair,
    /// served through the cache
    pub async fn indicator(
        &self,
        indicator_id: &str,
        country_code: &str,
    ) -> FetchResult<Indicator> {
        let key = CacheKey::indicator(country_code, indicator_id);
        self.gateway
            .fetch_with_cache(&key, self.default_ttl, || {
                self.indicator_uncached(indicator_id, country_code)
            })
            .await
    }

    /// Aggregated info + time-series, bypassing the cache entirely
    ///
    /// The info and data sub-fetches run concurrently; either failure
    /// fails the join.
    pub async fn indicator_uncached(
        &self,
        indicator_id: &str,
        country_code: &str,
    ) -> FetchResult<Indicator> {
        let request = PageRequest::IndicatorData {
            indicator_id: indicator_id.to_string(),
            country_code: country_code.to_string(),
        };

        aggregate::join_info_and_data(
            indicator_id,
            country_code,
            self.client.indicator_info(indicator_id),
            self.fetcher.fetch_series(&request),
        )
        .await
    }

    /// All indicators of a topic for one country, fetched concurrently
    /// fail-fast
    pub async fn indicators(
        &self,
        indicator_ids: &[String],
        country_code: &str,
    ) -> FetchResult<Vec<Indicator>> {
        let tasks: Vec<_> = indicator_ids
            .iter()
            .map(|indicator_id| {
                let service = self.clone();
                let indicator_id = indicator_id.clone();
                let country_code = country_code.to_string();
                async move { service.indicator(&indicator_id, &country_code).await }
            })
            .collect();

        coordinator::run_fail_fast(tasks).await
    }

    /// Several indicators for one country, fail-fast, bypassing the cache
    pub async fn indicators_uncached(
        &self,
        indicator_ids: &[String],
        country_code: &str,
    ) -> FetchResult<Vec<Indicator>> {
        let tasks: Vec<_> = indicator_ids
            .iter()
            .map(|indicator_id| {
                let service = self.clone();
                let indicator_id = indicator_id.clone();
                let country_code = country_code.to_string();
                async move {
                    service
                        .indicator_uncached(&indicator_id, &country_code)
                        .await
                }
            })
            .collect();

        coordinator::run_fail_fast(tasks).await
    }

    /// One indicator across several countries, tolerating per-country
    /// failures
    pub async fn indicator_for_countries(
        &self,
        indicator_id: &str,
        country_codes: &[String],
    ) -> CountryJoin {
        let tasks: Vec<_> = country_codes
            .iter()
            .map(|country_code| {
                let service = self.clone();
                let indicator_id = indicator_id.to_string();
                let country_code = country_code.clone();
                async move { service.indicator(&indicator_id, &country_code).await }
            })
            .collect();

        aggregate::join_countries(country_codes.to_vec(), tasks).await
    }

    /// One indicator across several countries, bypassing the cache
    pub async fn indicator_for_countries_uncached(
        &self,
        indicator_id: &str,
        country_codes: &[String],
    ) -> CountryJoin {
        let tasks: Vec<_> = country_codes
            .iter()
            .map(|country_code| {
                let service = self.clone();
                let indicator_id = indicator_id.to_string();
                let country_code = country_code.clone();
                async move {
                    service
                        .indicator_uncached(&indicator_id, &country_code)
                        .await
                }
            })
            .collect();

        aggregate::join_countries(country_codes.to_vec(), tasks).await
    }

    /// Country name -> ISO3 code table, served through the cache
    pub async fn countries(&self) -> FetchResult<BTreeMap<String, String>> {
        let key = CacheKey::countries();
        self.gateway
            .fetch_with_cache(&key, self.default_ttl, || self.countries_uncached())
            .await
    }

    /// Country table, bypassing the cache
    pub async fn countries_uncached(&self) -> FetchResult<BTreeMap<String, String>> {
        self.fetcher.fetch_countries().await
    }

    /// Access to the underlying cache gateway (status, clear)
    pub fn gateway(&self) -> &CacheGateway<B> {
        &self.gateway
    }
}
