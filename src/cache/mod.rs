//! Asset caching with LRU eviction policy
//!
//! [`AssetCache`] keeps fetched bytes under a memory budget. [`CachedFetcher`]
//! puts it in front of any [`AssetFetcher`] and owns the parsed-scene cache
//! that `preload` warms.

pub mod metrics;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use xxhash_rust::xxh3::xxh3_64;

use crate::catalog::AssetId;
use crate::fetch::{AssetBytes, AssetFetcher, FetchError};
use crate::scene::{SceneCache, SceneModel};
use metrics::FetchMetricsHandle;

/// Represents a cached asset with metadata
struct CachedAsset {
    bytes: AssetBytes,
    size: usize,
}

/// Fetched asset bytes with LRU eviction under a memory budget
pub struct AssetCache {
    entries: RwLock<HashMap<u64, CachedAsset>>,
    lru: Mutex<VecDeque<u64>>,
    max_memory: usize,
    current_memory: AtomicUsize,
    metrics: FetchMetricsHandle,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("entries", &self.len())
            .field("max_memory", &self.max_memory)
            .field("current_memory", &self.memory_usage())
            .finish()
    }
}

impl AssetCache {
    /// Creates a new AssetCache with the specified memory limit in bytes
    pub fn new(max_memory: usize) -> Self {
        Self::with_metrics(max_memory, FetchMetricsHandle::new())
    }

    /// Creates a cache reporting into an existing metrics handle
    pub fn with_metrics(max_memory: usize, metrics: FetchMetricsHandle) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            lru: Mutex::new(VecDeque::new()),
            max_memory,
            current_memory: AtomicUsize::new(0),
            metrics,
        }
    }

    /// Look up an asset, recording a hit or miss and refreshing its LRU slot
    pub fn get(&self, id: &AssetId) -> Option<AssetBytes> {
        let key = Self::key(id);
        let bytes = self.entries.read().get(&key).map(|c| Arc::clone(&c.bytes));

        match bytes {
            Some(bytes) => {
                self.metrics.record_cache_hit();
                let mut lru = self.lru.lock();
                if let Some(pos) = lru.iter().position(|&k| k == key) {
                    lru.remove(pos);
                }
                lru.push_back(key);
                Some(bytes)
            }
            None => {
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    /// Look up an asset without touching metrics or LRU order
    pub fn peek(&self, id: &AssetId) -> Option<AssetBytes> {
        self.entries
            .read()
            .get(&Self::key(id))
            .map(|c| Arc::clone(&c.bytes))
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries.read().contains_key(&Self::key(id))
    }

    /// Insert an asset, evicting least recently used entries as needed.
    ///
    /// Returns `false` when the asset alone exceeds the budget and was not cached.
    pub fn insert(&self, id: &AssetId, bytes: AssetBytes) -> bool {
        let size = bytes.len();
        if size > self.max_memory {
            log::trace!("{} ({} bytes) exceeds cache budget, not cached", id, size);
            return false;
        }

        let key = Self::key(id);
        let mut entries = self.entries.write();
        let mut lru = self.lru.lock();

        if let Some(previous) = entries.remove(&key) {
            self.current_memory.fetch_sub(previous.size, Ordering::SeqCst);
            if let Some(pos) = lru.iter().position(|&k| k == key) {
                lru.remove(pos);
            }
        }

        while self.current_memory.load(Ordering::SeqCst) + size > self.max_memory {
            let Some(oldest) = lru.pop_front() else {
                break;
            };
            if let Some(removed) = entries.remove(&oldest) {
                self.current_memory.fetch_sub(removed.size, Ordering::SeqCst);
                self.metrics.record_eviction();
            }
        }

        entries.insert(key, CachedAsset { bytes, size });
        lru.push_back(key);
        self.current_memory.fetch_add(size, Ordering::SeqCst);
        true
    }

    /// Clears all cached assets
    pub fn clear(&self) {
        self.entries.write().clear();
        self.lru.lock().clear();
        self.current_memory.store(0, Ordering::SeqCst);
    }

    /// Gets the current memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.current_memory.load(Ordering::Relaxed)
    }

    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn metrics(&self) -> &FetchMetricsHandle {
        &self.metrics
    }

    fn key(id: &AssetId) -> u64 {
        xxh3_64(id.as_str().as_bytes())
    }
}

/// Wraps a fetcher with a byte cache and a parsed-scene cache.
///
/// `fetch` serves repeats from memory. `preload` parses the cached bytes into
/// a [`SceneModel`] so the viewer can attach it without parsing again.
pub struct CachedFetcher<F> {
    inner: F,
    bytes: AssetCache,
    scenes: SceneCache,
}

impl<F: AssetFetcher> CachedFetcher<F> {
    pub fn new(inner: F, max_memory: usize) -> Self {
        Self {
            inner,
            bytes: AssetCache::new(max_memory),
            scenes: SceneCache::new(),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn byte_cache(&self) -> &AssetCache {
        &self.bytes
    }

    pub fn scene_cache(&self) -> &SceneCache {
        &self.scenes
    }

    pub fn metrics(&self) -> &FetchMetricsHandle {
        self.bytes.metrics()
    }
}

#[async_trait::async_trait]
impl<F: AssetFetcher> AssetFetcher for CachedFetcher<F> {
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError> {
        if let Some(bytes) = self.bytes.get(id) {
            return Ok(bytes);
        }

        let start = Instant::now();
        let bytes = self.inner.fetch(id).await?;
        self.metrics()
            .record_fetch(id.as_str(), start.elapsed(), bytes.len());
        self.bytes.insert(id, Arc::clone(&bytes));
        Ok(bytes)
    }

    fn preload(&self, id: &AssetId) -> Result<(), FetchError> {
        if self.scenes.contains(id) {
            return Ok(());
        }

        let bytes = self
            .bytes
            .peek(id)
            .ok_or_else(|| FetchError::NotCached(id.clone()))?;
        let scene = SceneModel::from_glb(id.clone(), &bytes)
            .map_err(|e| FetchError::Preload(e.to_string()))?;
        self.scenes.insert(scene);
        Ok(())
    }

    fn cached_scene(&self, id: &AssetId) -> Option<Arc<SceneModel>> {
        self.scenes.get(id)
    }
}
