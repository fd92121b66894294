//! Cache-aside gateway with transparent local fallback
//!
//! The gateway wraps any fetch operation in the cache-aside pattern:
//! check the distributed backend, call the producer on a miss, write the
//! result back with a TTL. When the distributed backend is unreachable
//! at connection level, the whole call is routed to an in-process
//! fallback cache with its own TTL clock, and the caller never observes
//! the outage. Backend selection is re-evaluated on every call, so a
//! recovered backend is picked up on the next request without a restart.
//!
//! Values are stored as JSON bytes in both backends. The distributed
//! backend expires records server-side; the local backend purges them
//! lazily on read.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::cache;
use crate::errors::{CacheResult, FetchResult};
use crate::app::models::CacheKey;

pub mod config;
pub mod memory;
pub mod redis;

pub use config::CacheConfig;
pub use memory::MemoryBackend;
pub use redis::RedisBackend;

/// A shared cache backend addressed by string keys
///
/// Atomic per-key GET/SET is all the gateway needs; the backend is
/// externally synchronized, so no client-side locking is involved.
/// `CacheError::Unavailable` marks connection-level failures and must
/// be distinguishable from a missing key (`Ok(None)`).
#[async_trait]
pub trait DistributedCache: Send + Sync {
    /// Read the bytes stored under a key, `None` when the key is absent
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store bytes under a key with a TTL enforced by the backend
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Check backend reachability
    async fn ping(&self) -> CacheResult<()>;

    /// Remove every stored record
    async fn flush(&self) -> CacheResult<()>;
}

/// Reachability report for the `cache status` command
#[derive(Debug, Clone)]
pub struct CacheStatus {
    /// Whether the distributed backend answered a PING
    pub distributed_reachable: bool,
    /// Entries currently held by the local fallback
    pub local_entries: usize,
}

/// Cache-aside decorator around fetch operations
///
/// Constructed once per process and cloned into callers; both backends
/// are cheap to clone and internally shared.
#[derive(Clone)]
pub struct CacheGateway<B: DistributedCache> {
    distributed: B,
    local: MemoryBackend,
    key_prefix: String,
}

impl<B: DistributedCache> CacheGateway<B> {
    /// Create a gateway over a distributed backend with a fresh local
    /// fallback
    pub fn new(distributed: B, key_prefix: impl Into<String>) -> Self {
        Self {
            distributed,
            local: MemoryBackend::new(),
            key_prefix: key_prefix.into(),
        }
    }

    /// Full storage key for a logical cache key
    fn storage_key(&self, key: &CacheKey) -> String {
        format!("{}{}{}", self.key_prefix, cache::KEY_SEPARATOR, key)
    }

    /// Fetch a value through the cache
    ///
    /// On a hit the producer is never invoked. On a miss the producer
    /// runs, and its failure propagates without anything being written.
    /// A successful produce is written back to whichever backend served
    /// this call before the value is returned; a failed write is logged
    /// and never corrupts the returned value.
    pub async fn fetch_with_cache<T, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        produce: F,
    ) -> FetchResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        let storage_key = self.storage_key(key);

        match self.distributed.get(&storage_key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    debug!(key = %storage_key, "distributed cache hit");
                    return Ok(value);
                }
                Err(error) => {
                    // Undecodable record: treat as a miss and overwrite below
                    warn!(key = %storage_key, %error, "cached record undecodable, refetching");
                }
            },
            Ok(None) => {
                debug!(key = %storage_key, "distributed cache miss");
            }
            Err(error) => {
                // Connection-level failure: this call runs against the
                // local fallback, and the outage stops here.
                warn!(key = %storage_key, %error, "distributed cache unreachable, using local fallback");
                return self.fetch_via_local(&storage_key, ttl, produce).await;
            }
        }

        let value = produce().await?;
        self.write_distributed(&storage_key, &value, ttl).await;
        Ok(value)
    }

    /// Cache-aside against the local fallback for one call
    async fn fetch_via_local<T, F, Fut>(
        &self,
        storage_key: &str,
        ttl: Duration,
        produce: F,
    ) -> FetchResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        if let Some(bytes) = self.local.get(storage_key) {
            match serde_json::from_slice(&bytes) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(key = %storage_key, %error, "local cached record undecodable, refetching");
                }
            }
        }

        let value = produce().await?;
        match serde_json::to_vec(&value) {
            Ok(bytes) => self.local.set(storage_key, bytes, ttl),
            Err(error) => warn!(key = %storage_key, %error, "skipping local cache write"),
        }
        Ok(value)
    }

    /// Best-effort write-back to the distributed backend
    async fn write_distributed<T: Serialize>(&self, storage_key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(key = %storage_key, %error, "skipping cache write, value not serializable");
                return;
            }
        };

        if let Err(error) = self.distributed.set(storage_key, bytes, ttl).await {
            warn!(key = %storage_key, %error, "cache write failed, returning uncached value");
        }
    }

    /// Report reachability of the distributed backend and the size of
    /// the local fallback
    pub async fn status(&self) -> CacheStatus {
        let distributed_reachable = self.distributed.ping().await.is_ok();
        self.local.purge_expired();
        CacheStatus {
            distributed_reachable,
            local_entries: self.local.len(),
        }
    }

    /// Clear both backends
    ///
    /// An unreachable distributed backend is logged, not surfaced; the
    /// local fallback is always cleared.
    pub async fn clear(&self) {
        if let Err(error) = self.distributed.flush().await {
            warn!(%error, "could not flush distributed cache");
        }
        self.local.clear();
    }
}
