//! Per-user key/value storage and camera pose persistence
//!
//! Persistence never fails loudly: a missing, unreadable or corrupt record
//! reads as "no saved pose", and write failures are logged and dropped.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

use super::CameraPose;

/// Storage key the viewer saves its camera framing under
pub const DEFAULT_POSE_KEY: &str = "viewerCam";

/// Error type for key/value storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key/value persistence scoped to one user or profile
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store with an optional byte quota over keys and values
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write();

        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a profile directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Loads and saves the camera pose under one storage key
#[derive(Debug)]
pub struct PosePersistence<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> PosePersistence<K> {
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the saved pose; any failure reads as `None`
    pub fn load(&self) -> Option<CameraPose> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                log::debug!("Could not read saved camera pose: {}", err);
                return None;
            }
        };

        match serde_json::from_str::<CameraPose>(&raw) {
            Ok(pose) => Some(pose.sanitized()),
            Err(err) => {
                log::debug!("Ignoring unreadable camera pose under {:?}: {}", self.key, err);
                None
            }
        }
    }

    /// Write the pose; failures are logged and dropped
    pub fn save(&self, pose: &CameraPose) {
        if let Err(err) = self.try_save(pose) {
            log::warn!("Could not save camera pose: {}", err);
        }
    }

    /// Write the pose, reporting failures
    pub fn try_save(&self, pose: &CameraPose) -> Result<(), StorageError> {
        let raw = serde_json::to_string(pose)?;
        self.store.set(&self.key, &raw)
    }

    /// Forget the saved pose
    pub fn clear(&self) {
        if let Err(err) = self.store.remove(&self.key) {
            log::warn!("Could not clear camera pose: {}", err);
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &K {
        &self.store
    }
}
