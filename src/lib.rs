//! showcase_viewer - 3D product viewer core with background prefetching
//!
//! # Features
//! - Ordered model catalog with canonical asset identifiers
//! - Neighbour-first prefetching with cancellable epochs
//! - Byte cache and parsed-scene cache in front of any fetch adapter
//! - Loading indicator state with a settle debounce
//! - Camera framing persisted per user
//! - Async runtime abstraction (Tokio, or a virtual clock in tests)
//!
//! # Quick Start
//!
//! ```ignore
//! use showcase_viewer::{CachedFetcher, FileFetcher, MemoryStore, ModelViewer, TokioSpawner, ViewerConfig};
//!
//! let config = ViewerConfig::default();
//! let fetcher = Arc::new(CachedFetcher::new(FileFetcher::new(&config.asset_root), config.cache_budget_bytes));
//! let viewer = ModelViewer::new(&config, TokioSpawner::new(), fetcher, MemoryStore::new())?;
//! viewer.select(Some("/X_Egg.glb".parse()?));
//! let scene = viewer.load_selected().await?;
//! ```
//!
//! # Feature Flags
//!
//! - `runtime-tokio`: Enable the Tokio spawner (default)
//! - `fetch-http`: Enable the HTTP fetch adapter

// Core modules
pub mod cache;
pub mod camera;
pub mod catalog;
pub mod fetch;
pub mod prefetch;
pub mod runtime;
pub mod viewer;

// Support modules
pub mod config;
pub mod scene;

// Error types
mod error;
pub use error::{Result, ViewerError};

// Re-export cache types
pub use cache::metrics::{FetchMetrics, FetchMetricsHandle};
pub use cache::{AssetCache, CachedFetcher};

// Re-export catalog types
pub use catalog::{AssetId, Catalog, PRODUCT_LINE};

// Re-export fetch types
#[cfg(feature = "fetch-http")]
pub use fetch::HttpFetcher;
pub use fetch::{AssetBytes, AssetFetcher, FetchError, FileFetcher, MockFetcher};

// Re-export runtime types
pub use runtime::mock::{MockSpawnBehavior, MockSpawner};
#[cfg(feature = "runtime-tokio")]
pub use runtime::tokio_impl::TokioSpawner;
pub use runtime::{TaskHandle, TaskSpawner};

// Re-export prefetch types
pub use prefetch::{
    priority_order, FetchPlan, FetchTier, PlannedFetch, PrefetchScheduler, PrefetchTiming,
};

// Re-export camera types
pub use camera::{
    CameraPose, FileStore, KeyValueStore, MemoryStore, OrbitLimits, PosePersistence, StorageError,
};

// Re-export viewer types
pub use viewer::{
    IndicatorKind, IndicatorSize, LoadState, LoadingIndicator, ModelViewer, ViewerSurface,
};

pub use config::{ConfigError, ViewerConfig};
pub use scene::{ModelPlacement, SceneCache, SceneError, SceneModel};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_product_line_catalog() {
        let catalog = Catalog::product_line();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get(0).map(AssetId::as_str), Some("/super_burguer.glb"));
    }
}
