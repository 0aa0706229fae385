//! Error types for showcase_viewer

use thiserror::Error;

/// Main error type for viewer operations
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::camera::storage::StorageError),

    #[error("Scene error: {0}")]
    Scene(#[from] crate::scene::SceneError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid asset id: {0:?}")]
    InvalidAssetId(String),

    #[error("No model selected")]
    NothingSelected,
}

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;
