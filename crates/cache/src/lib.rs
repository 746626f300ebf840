//! Response memoization for the API service.
//!
//! Cache-aside over a bounded in-process [`moka`] cache of JSON values.
//! Each entry carries its own TTL so endpoints can pick expirations
//! between a few minutes and half an hour.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_CAPACITY: u64 = 1024;

#[derive(Clone)]
struct CachedValue {
    value: Arc<Value>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Hit/miss and utilization numbers, surfaced by the tool-health endpoint
/// and the Prometheus scrape.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
    pub capacity: u64,
    pub utilization: f64,
}

pub struct CacheManager {
    inner: Cache<String, CachedValue>,
    capacity: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self {
            inner,
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a key, counting the hit or miss.
    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        match self.inner.get(key).await {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "cache hit");
                Some(entry.value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "cache miss");
                None
            }
        }
    }

    /// Store a value with the given TTL.
    ///
    /// Callers must not store empty aggregation results; a transient
    /// upstream failure would otherwise be served for a whole TTL window.
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let entry = CachedValue {
            value: Arc::new(value),
            ttl,
        };
        self.inner.insert(key.into(), entry).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    pub async fn stats(&self) -> CacheStats {
        // entry_count is eventually consistent until pending tasks run
        self.inner.run_pending_tasks().await;

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        let entries = self.inner.entry_count();
        let utilization = if self.capacity == 0 {
            0.0
        } else {
            entries as f64 / self.capacity as f64
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries,
            capacity: self.capacity,
            utilization,
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_after_set_returns_value() {
        let cache = CacheManager::new();
        cache
            .set("velocity:v2:1:6", json!({"n": 42}), Duration::from_secs(60))
            .await;

        let value = cache.get("velocity:v2:1:6").await.expect("should hit");
        assert_eq!(value["n"], 42);
    }

    #[tokio::test]
    async fn miss_on_unknown_key() {
        let cache = CacheManager::new();
        assert!(cache.get("nothing-here").await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = CacheManager::new();
        cache
            .set("short-lived", json!(1), Duration::from_millis(50))
            .await;
        assert!(cache.get("short-lived").await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("short-lived").await.is_none());
    }

    #[tokio::test]
    async fn stats_track_hits_and_misses() {
        let cache = CacheManager::new();
        cache.set("k", json!("v"), Duration::from_secs(60)).await;

        cache.get("k").await;
        cache.get("k").await;
        cache.get("absent").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn utilization_reflects_capacity() {
        let cache = CacheManager::with_capacity(4);
        cache.set("a", json!(1), Duration::from_secs(60)).await;
        cache.set("b", json!(2), Duration::from_secs(60)).await;

        let stats = cache.stats().await;
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.entries, 2);
        assert!((stats.utilization - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = CacheManager::new();
        cache.set("k", json!("v"), Duration::from_secs(60)).await;
        cache.invalidate("k").await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let cache = CacheManager::new();
        cache.set("a", json!(1), Duration::from_secs(60)).await;
        cache.set("b", json!(2), Duration::from_secs(60)).await;
        cache.clear().await;

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 0);
    }

    #[tokio::test]
    async fn hit_rate_zero_without_traffic() {
        let cache = CacheManager::new();
        let stats = cache.stats().await;
        assert_eq!(stats.hit_rate, 0.0);
    }
}
