//! Integration tests for the cache gateway
//!
//! These tests drive the public `CacheGateway` API end-to-end with a
//! controllable distributed backend, verifying the cache-aside flow,
//! the transparent fallback during backend outages, and the per-call
//! backend re-evaluation after recovery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use wdi_fetcher::app::{CacheGateway, CacheKey, DistributedCache};
use wdi_fetcher::errors::{CacheError, CacheResult, FetchError};

/// A distributed backend whose reachability can be toggled mid-test
#[derive(Clone, Default)]
struct ToggleBackend {
    store: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    online: Arc<AtomicBool>,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
}

impl ToggleBackend {
    fn online() -> Self {
        let backend = Self::default();
        backend.online.store(true, Ordering::SeqCst);
        backend
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::unavailable("connection refused"))
        }
    }
}

#[async_trait]
impl DistributedCache for ToggleBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.check()?;
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.store.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check()
    }

    async fn flush(&self) -> CacheResult<()> {
        self.check()?;
        self.store.lock().unwrap().clear();
        Ok(())
    }
}

fn gateway(backend: ToggleBackend) -> CacheGateway<ToggleBackend> {
    CacheGateway::new(backend, "wdi")
}

#[tokio::test]
async fn second_call_is_served_from_distributed_backend() {
    let backend = ToggleBackend::online();
    let gateway = gateway(backend.clone());
    let key = CacheKey::indicator("USA", "SP.POP.TOTL");
    let produced = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let produced = Arc::clone(&produced);
        let value: String = gateway
            .fetch_with_cache(&key, Duration::from_secs(60), move || async move {
                produced.fetch_add(1, Ordering::SeqCst);
                Ok("population".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "population");
    }

    assert_eq!(produced.load(Ordering::SeqCst), 1);
    assert_eq!(backend.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn outage_is_invisible_to_the_caller() {
    let backend = ToggleBackend::default(); // offline from the start
    let gateway = gateway(backend.clone());
    let key = CacheKey::indicator("MKD", "NY.GDP.MKTP.CD");

    let value: f64 = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async { Ok(13.8) })
        .await
        .unwrap();
    assert_eq!(value, 13.8);

    // Second call during the outage hits the local fallback, not the producer
    let value: f64 = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async {
            Err::<f64, _>(FetchError::invalid_data("producer must not run"))
        })
        .await
        .unwrap();
    assert_eq!(value, 13.8);

    // Nothing ever reached the distributed store
    assert!(backend.store.lock().unwrap().is_empty());
}

#[tokio::test]
async fn recovered_backend_is_used_without_restart() {
    let backend = ToggleBackend::default();
    let gateway = gateway(backend.clone());
    let key = CacheKey::countries();

    let value: u32 = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async { Ok(1) })
        .await
        .unwrap();
    assert_eq!(value, 1);

    backend.set_online(true);

    // Backend selection happens per call: the recovered backend misses
    // (the outage-era value lives only in the fallback) and the fresh
    // value is written through to it.
    let value: u32 = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async { Ok(2) })
        .await
        .unwrap();
    assert_eq!(value, 2);
    assert_eq!(backend.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn local_fallback_honors_its_own_ttl() {
    let backend = ToggleBackend::default();
    let gateway = gateway(backend.clone());
    let key = CacheKey::indicator("ALB", "SP.POP.TOTL");

    let value: u32 = gateway
        .fetch_with_cache(&key, Duration::from_millis(20), || async { Ok(7) })
        .await
        .unwrap();
    assert_eq!(value, 7);

    tokio::time::sleep(Duration::from_millis(40)).await;

    let value: u32 = gateway
        .fetch_with_cache(&key, Duration::from_millis(20), || async { Ok(8) })
        .await
        .unwrap();
    assert_eq!(value, 8);
}

#[tokio::test]
async fn produce_failure_propagates_and_caches_nothing() {
    let backend = ToggleBackend::online();
    let gateway = gateway(backend.clone());
    let key = CacheKey::indicator("USA", "SP.POP.TOTL");

    let result: Result<String, _> = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async {
            Err::<String, _>(FetchError::invalid_data("upstream returned garbage"))
        })
        .await;

    assert!(result.is_err());
    assert!(backend.store.lock().unwrap().is_empty());

    // The next call retries the producer instead of serving a poisoned entry
    let value: String = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async {
            Ok("recovered".to_string())
        })
        .await
        .unwrap();
    assert_eq!(value, "recovered");
}

#[tokio::test]
async fn status_reports_reachability_and_fallback_size() {
    let backend = ToggleBackend::online();
    let gateway = gateway(backend.clone());

    let status = gateway.status().await;
    assert!(status.distributed_reachable);
    assert_eq!(status.local_entries, 0);

    backend.set_online(false);
    let key = CacheKey::countries();
    let _: u32 = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async { Ok(1) })
        .await
        .unwrap();

    let status = gateway.status().await;
    assert!(!status.distributed_reachable);
    assert_eq!(status.local_entries, 1);
}

#[tokio::test]
async fn clear_empties_both_backends() {
    let backend = ToggleBackend::online();
    let gateway = gateway(backend.clone());
    let key = CacheKey::indicator("USA", "SP.POP.TOTL");

    let _: u32 = gateway
        .fetch_with_cache(&key, Duration::from_secs(60), || async { Ok(1) })
        .await
        .unwrap();

    gateway.clear().await;

    assert!(backend.store.lock().unwrap().is_empty());
    assert_eq!(gateway.status().await.local_entries, 0);
}
