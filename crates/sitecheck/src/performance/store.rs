// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared state for the performance prober.
//!
//! One store is shared by every prober in the process: the result cache,
//! the single-slot gate around PageSpeed calls, and the time of the last
//! call for the global cooldown.

use super::{PerformanceResult, Strategy};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

/// Cache entry with metadata.
struct CacheEntry {
    result: PerformanceResult,
    cached_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() >= ttl
    }
}

/// Cache, gate and cooldown clock.
pub struct PerformanceStore {
    cache: Mutex<HashMap<(String, Strategy), CacheEntry>>,
    gate: Mutex<()>,
    last_call: Mutex<Option<Instant>>,
    ttl: Duration,
    cooldown: Duration,
}

impl PerformanceStore {
    pub fn new(ttl: Duration, cooldown: Duration) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            gate: Mutex::new(()),
            last_call: Mutex::new(None),
            ttl,
            cooldown,
        }
    }

    /// Fresh cached result, marked `cached`. Expired entries are evicted here.
    pub async fn get(&self, url: &str, strategy: Strategy) -> Option<PerformanceResult> {
        let mut cache = self.cache.lock().await;
        let key = (url.to_string(), strategy);
        if cache.get(&key)?.is_expired(self.ttl) {
            cache.remove(&key);
            return None;
        }
        cache.get(&key).map(|entry| PerformanceResult {
            cached: true,
            ..entry.result.clone()
        })
    }

    /// Cache an API result. An existing fresh entry is left untouched.
    pub async fn insert(&self, url: &str, strategy: Strategy, result: PerformanceResult) {
        let mut cache = self.cache.lock().await;
        let key = (url.to_string(), strategy);
        let fresh = cache
            .get(&key)
            .map(|e| !e.is_expired(self.ttl))
            .unwrap_or(false);
        if !fresh {
            cache.insert(
                key,
                CacheEntry {
                    result,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    /// Time left before the next PageSpeed call is allowed, if any.
    pub async fn cooldown_remaining(&self) -> Option<Duration> {
        let last = (*self.last_call.lock().await)?;
        let elapsed = last.elapsed();
        (elapsed < self.cooldown).then(|| self.cooldown - elapsed)
    }

    /// Record that a PageSpeed call is being issued now.
    pub async fn stamp_call(&self) {
        *self.last_call.lock().await = Some(Instant::now());
    }

    /// Acquire the single-slot gate. Held for the duration of one call.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for PerformanceStore {
    /// Six-hour freshness, ten-second cooldown.
    fn default() -> Self {
        Self::new(Duration::from_secs(6 * 60 * 60), Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u32) -> PerformanceResult {
        PerformanceResult::from_api(score, Default::default())
    }

    #[tokio::test]
    async fn test_cache_hit_is_marked_cached() {
        let store = PerformanceStore::default();
        store.insert("https://a.com", Strategy::Mobile, result(91)).await;

        let hit = store.get("https://a.com", Strategy::Mobile).await.unwrap();
        assert!(hit.cached);
        assert_eq!(hit.score, Some(91));
        assert!(store.get("https://a.com", Strategy::Desktop).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted_on_read() {
        let store = PerformanceStore::new(Duration::ZERO, Duration::from_secs(10));
        store.insert("https://a.com", Strategy::Mobile, result(50)).await;
        assert_eq!(store.len().await, 1);
        assert!(store.get("https://a.com", Strategy::Mobile).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_fresh_entry_not_overwritten() {
        let store = PerformanceStore::default();
        store.insert("https://a.com", Strategy::Mobile, result(70)).await;
        store.insert("https://a.com", Strategy::Mobile, result(10)).await;
        let hit = store.get("https://a.com", Strategy::Mobile).await.unwrap();
        assert_eq!(hit.score, Some(70));
    }

    #[tokio::test]
    async fn test_cooldown() {
        let store = PerformanceStore::new(Duration::from_secs(60), Duration::from_secs(30));
        assert!(store.cooldown_remaining().await.is_none());
        store.stamp_call().await;
        let left = store.cooldown_remaining().await.unwrap();
        assert!(left <= Duration::from_secs(30));
        assert!(left > Duration::from_secs(25));

        let open = PerformanceStore::new(Duration::from_secs(60), Duration::ZERO);
        open.stamp_call().await;
        assert!(open.cooldown_remaining().await.is_none());
    }
}
