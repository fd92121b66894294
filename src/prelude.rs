//! Prelude module for WDI Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use wdi_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use wdi_fetcher::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = CacheConfig::default();
//!     let backend = RedisBackend::new(&config.redis_url)?;
//!     let gateway = CacheGateway::new(backend, config.key_prefix.clone());
//!     let client = Arc::new(WdiClient::new()?);
//!
//!     let service = IndicatorService::new(client, gateway, config.default_ttl);
//!     let indicator = service.indicator("SP.POP.TOTL", "USA").await?;
//!     println!("{}", indicator.title);
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    CacheConfig,
    CacheGateway,
    CacheStatus,

    ClientConfig,
    WdiClient,

    DistributedCache,
    MemoryBackend,
    RedisBackend,

    // Data types
    CacheKey,
    CountryJoin,
    Indicator,
    IndicatorInfo,
    TimeSeries,

    // Core orchestration
    IndicatorService,
    PagedFetcher,
    PageRequest,
    PageSource,
};

// Configuration loading
pub use crate::config::AppConfig;
