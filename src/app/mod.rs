//! Core application logic for WDI Fetcher
//!
//! This module contains the main application components: the HTTP
//! client, data models, the concurrent pagination engine, the
//! aggregation joins, and the cache-aside gateway with its backends.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wdi_fetcher::app::{
//!     CacheConfig, CacheGateway, IndicatorService, RedisBackend, WdiClient,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheConfig::default();
//! let backend = RedisBackend::new(&config.redis_url)?;
//! let gateway = CacheGateway::new(backend, config.key_prefix.clone());
//! let client = Arc::new(WdiClient::new()?);
//!
//! let service = IndicatorService::new(client, gateway, config.default_ttl);
//! let indicator = service.indicator("SP.POP.TOTL", "USA").await?;
//! println!("{}: {} data points", indicator.title, indicator.data.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod client;
pub mod coordinator;
pub mod fetcher;
pub mod models;
pub mod service;

// Re-export main public API
pub use cache::{
    CacheConfig, CacheGateway, CacheStatus, DistributedCache, MemoryBackend, RedisBackend,
};
pub use client::{ClientConfig, WdiClient};
pub use fetcher::{PagedFetcher, PageRecord, PageRequest, PageSource};
pub use models::{
    CacheKey, CountryJoin, CountryRecord, DataRecord, FailedCountry, Indicator, IndicatorInfo,
    PageMeta, RawPage, ResourceKind, TimeSeries,
};
pub use service::IndicatorService;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert!(config.rate_limit_rps > 0);
        assert_eq!(CacheKey::countries().kind, ResourceKind::Countries);
    }
}
