//! Asset fetch adapters
//!
//! The viewer and the prefetcher only see [`AssetFetcher`]. Concrete adapters
//! read from the static asset directory, from HTTP, or from memory in tests.

pub mod file;
#[cfg(feature = "fetch-http")]
pub mod http;
pub mod mock;

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::AssetId;
use crate::scene::SceneModel;

pub use file::FileFetcher;
#[cfg(feature = "fetch-http")]
pub use http::HttpFetcher;
pub use mock::MockFetcher;

/// Raw bytes of a fetched asset, shared between caches without copying
pub type AssetBytes = Arc<[u8]>;

/// Error type for fetch operations
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    #[error("Asset path escapes the asset root: {0}")]
    OutsideRoot(AssetId),

    #[error("Unsupported asset location: {0}")]
    Unsupported(AssetId),

    #[error("HTTP {status} fetching {id}")]
    Http { id: AssetId, status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Asset not cached: {0}")]
    NotCached(AssetId),

    #[error("Preload failed: {0}")]
    Preload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches model bytes by identifier.
///
/// `fetch` resolves once the whole asset is available. `preload` is a
/// best-effort hint to warm whatever downstream cache the adapter owns; callers
/// ignore its errors.
#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the raw bytes of an asset
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError>;

    /// Warm a downstream cache for an asset that was just fetched
    fn preload(&self, _id: &AssetId) -> Result<(), FetchError> {
        Ok(())
    }

    /// A scene already parsed by a previous `preload`, if the adapter keeps one
    fn cached_scene(&self, _id: &AssetId) -> Option<Arc<SceneModel>> {
        None
    }
}

#[async_trait::async_trait]
impl<F: AssetFetcher + ?Sized> AssetFetcher for Arc<F> {
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError> {
        (**self).fetch(id).await
    }

    fn preload(&self, id: &AssetId) -> Result<(), FetchError> {
        (**self).preload(id)
    }

    fn cached_scene(&self, id: &AssetId) -> Option<Arc<SceneModel>> {
        (**self).cached_scene(id)
    }
}
