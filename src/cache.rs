//! Bounded in-memory cache for aggregated search responses.
//!
//! Keys are normalized query strings; values are immutable
//! [`SearchResponse`]s shared out behind [`Arc`]. The cache enforces a
//! maximum item count and a maximum total serialized byte footprint,
//! evicting oldest-created entries first. Eviction is strict
//! creation-time FIFO, not LRU: a frequently re-read but never
//! rewritten entry is evicted exactly as readily as one nobody reads.
//! That is a deliberate simplicity/cost tradeoff, not an oversight.
//!
//! Capping is best-effort, reproducing the original accounting quirk:
//! eviction runs before an insert when limits are at or over threshold,
//! but the new item is always admitted afterwards, so a single entry
//! larger than `max_bytes` can leave `bytes_used` above the limit.
//!
//! Reads and writes are mutually exclusive at whole-cache granularity
//! through one [`RwLock`]; eviction runs under the same write lock as
//! `set`, which is what keeps the byte accounting exact.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::error::{Result, SearchError};
use crate::types::SearchResponse;

/// Point-in-time cache occupancy.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub item_count: usize,
    pub bytes_used: u64,
}

/// Occupancy plus configured limits and utilization percentages.
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetrics {
    pub item_count: usize,
    pub bytes_used: u64,
    pub max_items: usize,
    pub max_bytes: u64,
    pub items_used_percent: f64,
    pub bytes_used_percent: f64,
}

/// One cached response with its accounting metadata.
struct CacheEntry {
    value: Arc<SearchResponse>,
    created_at: Instant,
    /// Monotonic insertion counter; tie-breaks identical creation instants
    /// so eviction order stays deterministic.
    seq: u64,
    size_bytes: u64,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    bytes_used: u64,
    next_seq: u64,
}

/// Size- and count-bounded response cache with time-based expiry.
///
/// Explicitly constructed and passed by reference wherever it is
/// needed; there is no ambient global instance.
pub struct ResponseCache {
    inner: RwLock<CacheInner>,
    max_items: usize,
    max_bytes: u64,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache with the given limits and expiry policy.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                bytes_used: 0,
                next_seq: 0,
            }),
            max_items: config.max_items,
            max_bytes: config.max_bytes,
            ttl: config.default_ttl(),
        }
    }

    /// Store a response under the normalized `query` key.
    ///
    /// The entry's size is the serialized length of `value`, computed
    /// once here. Eviction runs first when either limit is at or over
    /// threshold; the new item is then always admitted.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cache`] if the value cannot be
    /// serialized for size accounting; the item is not admitted and
    /// existing entries are untouched.
    pub fn set(&self, query: &str, value: SearchResponse) -> Result<()> {
        let encoded = serde_json::to_vec(&value)
            .map_err(|e| SearchError::Cache(format!("error calculating item size: {e}")))?;
        let size_bytes = encoded.len() as u64;
        let key = normalize_key(query);

        let mut inner = self.write_lock();

        // Replacing a key reclaims the old entry's bytes before the
        // pressure checks.
        if let Some(old) = inner.entries.remove(&key) {
            inner.bytes_used -= old.size_bytes;
        }

        if inner.bytes_used + size_bytes > self.max_bytes {
            self.evict_oldest(&mut inner, size_bytes);
        }
        if inner.entries.len() >= self.max_items {
            self.evict_oldest(&mut inner, size_bytes);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                created_at: Instant::now(),
                seq,
                size_bytes,
            },
        );
        inner.bytes_used += size_bytes;

        Ok(())
    }

    /// Look up a response by query.
    ///
    /// Expired entries are a miss. Reads do not refresh recency —
    /// eviction order is purely creation-time.
    pub fn get(&self, query: &str) -> Option<Arc<SearchResponse>> {
        let inner = self.read_lock();
        let entry = inner.entries.get(&normalize_key(query))?;
        if self.is_expired(entry) {
            return None;
        }
        Some(Arc::clone(&entry.value))
    }

    /// Remove every entry older than the configured TTL, returning how
    /// many were reclaimed. Called periodically by the sweeper task;
    /// `get` already treats expired entries as misses in between sweeps.
    pub fn remove_expired(&self) -> usize {
        if self.ttl.is_zero() {
            return 0;
        }

        let mut inner = self.write_lock();
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(entry) = inner.entries.remove(key) {
                inner.bytes_used -= entry.size_bytes;
            }
        }

        expired.len()
    }

    /// Current occupancy. Read-only.
    pub fn stats(&self) -> CacheStats {
        let inner = self.read_lock();
        CacheStats {
            item_count: inner.entries.len(),
            bytes_used: inner.bytes_used,
        }
    }

    /// Occupancy, limits, and utilization percentages. Read-only.
    pub fn metrics(&self) -> CacheMetrics {
        let inner = self.read_lock();
        let item_count = inner.entries.len();
        let bytes_used = inner.bytes_used;
        CacheMetrics {
            item_count,
            bytes_used,
            max_items: self.max_items,
            max_bytes: self.max_bytes,
            items_used_percent: item_count as f64 / self.max_items as f64 * 100.0,
            bytes_used_percent: bytes_used as f64 / self.max_bytes as f64 * 100.0,
        }
    }

    /// Atomically remove all entries and reset the byte accounting.
    pub fn clear(&self) {
        let mut inner = self.write_lock();
        inner.entries.clear();
        inner.bytes_used = 0;
    }

    /// Delete entries oldest-created-first until the item count is
    /// below `max_items` and the pending insert of `incoming_bytes`
    /// would fit under `max_bytes`. An item larger than `max_bytes` on
    /// its own empties the cache and is still admitted.
    ///
    /// Must run under the write lock held by the caller, so the
    /// accounting invariant (`bytes_used` == sum of live entry sizes)
    /// never races an insert.
    fn evict_oldest(&self, inner: &mut CacheInner, incoming_bytes: u64) {
        let mut candidates: Vec<(String, Instant, u64)> = inner
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.created_at, entry.seq))
            .collect();
        candidates.sort_by_key(|(_, created_at, seq)| (*created_at, *seq));

        for (key, _, _) in candidates {
            if inner.entries.len() < self.max_items
                && inner.bytes_used + incoming_bytes <= self.max_bytes
            {
                break;
            }
            if let Some(entry) = inner.entries.remove(&key) {
                inner.bytes_used -= entry.size_bytes;
                tracing::debug!(%key, "evicted oldest cache entry");
            }
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        !self.ttl.is_zero() && entry.created_at.elapsed() >= self.ttl
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Normalize a query into its cache key: trimmed and lowercased.
fn normalize_key(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Spawn the background expiry sweep for `cache`, firing every
/// `interval`. The returned handle can be aborted at shutdown; entries
/// also expire lazily on `get`, so the sweep only reclaims memory.
pub fn spawn_sweeper(cache: Arc<ResponseCache>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.remove_expired();
            if removed > 0 {
                tracing::debug!(removed, "swept expired cache entries");
            }
        }
    })
}
