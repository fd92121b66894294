//! Redis distributed cache backend
//!
//! Connection pooling via deadpool; the pool is created lazily, so a
//! Redis server that is down at startup only surfaces as a per-call
//! `CacheError::Unavailable`, which the gateway recovers from locally.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Pool, Runtime};
use tracing::{debug, warn};

use super::DistributedCache;
use crate::errors::{CacheError, CacheResult};

/// Redis backend over a deadpool connection pool
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create a backend from a Redis connection URL
    ///
    /// No connection is attempted here; reachability is discovered per
    /// call, which is what lets the gateway re-evaluate backend health
    /// on every request.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` if the URL cannot be parsed
    /// into a pool configuration.
    pub fn new(url: &str) -> CacheResult<Self> {
        let cfg = PoolConfig::from_url(url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::unavailable(format!("failed to create Redis pool: {}", e)))?;

        debug!(url, "Redis backend configured");
        Ok(Self { pool })
    }

    async fn connection(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::unavailable(format!("failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl DistributedCache for RedisBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::unavailable(format!("Redis GET failed for {}: {}", key, e)))?;

        if value.is_some() {
            debug!(key, "Redis GET hit");
        } else {
            debug!(key, "Redis GET miss");
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| {
                CacheError::unavailable(format!("Redis SET_EX failed for {}: {}", key, e))
            })?;

        debug!(key, ttl_secs = seconds, "Redis SET");
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::unavailable(format!("Redis PING failed: {}", e)))?;

        if pong.contains("PONG") {
            Ok(())
        } else {
            Err(CacheError::unavailable(format!(
                "unexpected PING reply: {}",
                pong
            )))
        }
    }

    async fn flush(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        deadpool_redis::redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::unavailable(format!("Redis FLUSHDB failed: {}", e)))?;

        warn!("Redis FLUSHDB executed, all cached results cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_valid_url() {
        let backend = RedisBackend::new("redis://127.0.0.1:6379/0");
        assert!(backend.is_ok());
    }

    // Integration tests below require a running Redis server.
    // Run with: cargo test -- --ignored

    #[tokio::test]
    #[ignore]
    async fn test_set_get_roundtrip() {
        let backend = RedisBackend::new("redis://127.0.0.1:6379/0").unwrap();
        backend
            .set("wdi_test_key", b"value".to_vec(), Duration::from_secs(5))
            .await
            .expect("set failed");

        let value = backend.get("wdi_test_key").await.expect("get failed");
        assert_eq!(value, Some(b"value".to_vec()));
    }

    #[tokio::test]
    #[ignore]
    async fn test_ping() {
        let backend = RedisBackend::new("redis://127.0.0.1:6379/0").unwrap();
        backend.ping().await.expect("ping failed");
    }

    #[tokio::test]
    #[ignore]
    async fn test_ttl_expiry_server_side() {
        let backend = RedisBackend::new("redis://127.0.0.1:6379/0").unwrap();
        backend
            .set("wdi_ttl_key", b"soon gone".to_vec(), Duration::from_secs(1))
            .await
            .expect("set failed");

        tokio::time::sleep(Duration::from_secs(2)).await;
        let value = backend.get("wdi_ttl_key").await.expect("get failed");
        assert_eq!(value, None);
    }
}
