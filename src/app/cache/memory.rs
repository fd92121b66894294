//! In-process fallback cache
//!
//! Used by the gateway whenever the distributed backend is unreachable.
//! Entries carry their own expiry instant, so the fallback keeps honoring
//! TTLs across an arbitrary number of consecutive backend outages. The
//! store is purely in-memory and lost on process restart.
//!
//! DashMap provides per-key sharding, so concurrent in-flight requests
//! can read and write without an external lock; the expiry
//! check-and-remove on the read path happens under the shard lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// One cached value with its expiry instant
struct MemoryEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl MemoryEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe in-memory cache with independent TTL bookkeeping
///
/// Expired entries are purged lazily when a read observes them; callers
/// never see a stale value.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    /// Create an empty fallback cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a non-expired entry, removing it if its TTL has elapsed
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                debug!(key, "local cache hit");
                return Some(entry.data.clone());
            }
        }

        // Lazy purge of the expired entry, if one was there
        self.store.remove(key);
        debug!(key, "local cache miss");
        None
    }

    /// Store a value under the key with the given TTL, overwriting any
    /// previous entry
    pub fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        debug!(key, ttl_secs = ttl.as_secs(), "local cache store");
        self.store.insert(key.to_string(), MemoryEntry::new(value, ttl));
    }

    /// Number of entries currently held (expired entries included until
    /// the next read purges them)
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no entries are held
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove every entry whose TTL has elapsed
    pub fn purge_expired(&self) {
        self.store.retain(|_, entry| !entry.is_expired());
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.store.clear();
    }
}
