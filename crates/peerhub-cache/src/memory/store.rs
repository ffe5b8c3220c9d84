//! In-memory cache implementation using the moka crate.
//!
//! The single-node fallback behind [`CacheProvider`]: values live in a
//! moka cache with a cache-level TTL, while window counters (used by
//! rate limiting) are kept in a dashmap with explicit deadlines so
//! `incr`/`expire` behave like their Redis counterparts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use tracing::debug;

use peerhub_core::config::cache::MemoryCacheConfig;
use peerhub_core::result::AppResult;
use peerhub_core::traits::cache::CacheProvider;

/// A window counter with an optional expiry deadline.
#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    ///
    /// Moka applies one TTL at the cache level rather than per entry;
    /// read-side predicates (presence liveness, room usability) carry
    /// the fine-grained expiry semantics, so the cache-level TTL only
    /// needs to bound retention.
    cache: Cache<String, String>,
    /// Counters stored separately so incr/expire are atomic per key.
    counters: Arc<DashMap<String, Counter>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .build();

        Self {
            cache,
            counters: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.counters.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn scan(&self, pattern: &str) -> AppResult<Vec<(String, String)>> {
        // Moka doesn't support pattern scanning, so we iterate and
        // match on the prefix.
        let prefix = pattern.trim_end_matches('*');
        let pairs: Vec<(String, String)> = self
            .cache
            .iter()
            .filter(|entry| entry.0.starts_with(prefix))
            .map(|entry| (entry.0.to_string(), entry.1.clone()))
            .collect();
        Ok(pairs)
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let prefix = pattern.trim_end_matches('*');
        let mut count = 0u64;

        // Collect keys first; mutating while iterating is unsupported.
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| entry.0.starts_with(prefix))
            .map(|entry| entry.0.to_string())
            .collect();

        for key in keys_to_remove {
            self.cache.remove(&key).await;
            self.counters.remove(&key);
            count += 1;
        }

        debug!(pattern, count, "Deleted keys matching pattern");
        Ok(count)
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let now = Instant::now();
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        if entry.is_expired(now) {
            // Window rolled over; start a fresh count with no deadline
            // until the caller re-arms it.
            *entry = Counter {
                value: 0,
                expires_at: None,
            };
        }
        entry.value += 1;
        Ok(entry.value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        if let Some(mut entry) = self.counters.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
            return Ok(true);
        }
        // Values inherit the cache-level TTL; reinsert to restart it.
        if let Some(value) = self.cache.get(key).await {
            self.cache.insert(key.to_string(), value).await;
            return Ok(true);
        }
        Ok(false)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        self.counters.clear();
        Ok(())
    }
}
