use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks fetch and cache performance
#[derive(Debug, Default)]
pub struct FetchMetrics {
    fetch_times: RwLock<HashMap<String, Duration>>,
    fetch_counts: RwLock<HashMap<String, u64>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evictions: AtomicU64,
    fetched_bytes: AtomicU64,
}

impl FetchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how long the last network/disk fetch of an asset took
    pub fn record_fetch(&self, path: &str, duration: Duration, bytes: usize) {
        self.fetch_times.write().insert(path.to_string(), duration);
        *self
            .fetch_counts
            .write()
            .entry(path.to_string())
            .or_insert(0) += 1;
        self.fetched_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Cache hit rate as a percentage
    pub fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits() as f32;
        let misses = self.cache_misses() as f32;

        if hits + misses > 0.0 {
            hits / (hits + misses) * 100.0
        } else {
            0.0
        }
    }

    /// Total bytes pulled from the underlying fetcher
    pub fn fetched_bytes(&self) -> u64 {
        self.fetched_bytes.load(Ordering::Relaxed)
    }

    /// Duration of the most recent fetch of `path`
    pub fn last_fetch_time(&self, path: &str) -> Option<Duration> {
        self.fetch_times.read().get(path).cloned()
    }

    /// How many times `path` went to the underlying fetcher
    pub fn fetch_count(&self, path: &str) -> u64 {
        *self.fetch_counts.read().get(path).unwrap_or(&0)
    }
}

/// A cloneable shared handle to [`FetchMetrics`]
#[derive(Debug, Clone, Default)]
pub struct FetchMetricsHandle(Arc<FetchMetrics>);

impl FetchMetricsHandle {
    pub fn new() -> Self {
        Self(Arc::new(FetchMetrics::new()))
    }
}

impl std::ops::Deref for FetchMetricsHandle {
    type Target = FetchMetrics;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
