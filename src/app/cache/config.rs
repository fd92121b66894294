//! Cache configuration types and defaults

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::cache;

/// Configuration for the cache gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL for the distributed backend
    pub redis_url: String,
    /// Default time-to-live for cached results
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,
    /// Prefix joined in front of every storage key
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: cache::DEFAULT_REDIS_URL.to_string(),
            default_ttl: cache::DEFAULT_TTL,
            key_prefix: cache::KEY_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    /// Set the Redis connection URL
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    /// Set the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the storage key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}
