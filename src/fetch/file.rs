//! File-backed fetcher reading from the static asset directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{AssetBytes, AssetFetcher, FetchError};
use crate::catalog::AssetId;

/// Serves assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to a path under the root
    pub fn resolve(&self, id: &AssetId) -> Result<PathBuf, FetchError> {
        if id.is_url() {
            return Err(FetchError::Unsupported(id.clone()));
        }
        if id.relative_path().split('/').any(|segment| segment == "..") {
            return Err(FetchError::OutsideRoot(id.clone()));
        }
        Ok(self.root.join(id.relative_path()))
    }
}

#[async_trait::async_trait]
impl AssetFetcher for FileFetcher {
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError> {
        let path = self.resolve(id)?;
        match read_file(&path).await {
            Ok(data) => Ok(Arc::from(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::NotFound(id.clone())),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(feature = "runtime-tokio")]
async fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(path).await
}

#[cfg(not(feature = "runtime-tokio"))]
async fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path)
}
