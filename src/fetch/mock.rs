//! Mock fetcher for testing
//!
//! Records every fetch and preload, serves configurable payloads and fails on
//! demand. Clones share state, so a test can keep one clone for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{AssetBytes, AssetFetcher, FetchError};
use crate::catalog::AssetId;

/// Smallest GLB container the `gltf` crate accepts: one scene, one empty node.
pub fn placeholder_glb() -> Vec<u8> {
    let mut json = br#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{}]}"#
        .to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total_len = 12 + 8 + json.len();
    let mut glb = Vec::with_capacity(total_len);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_len as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb
}

#[derive(Debug, Default)]
struct MockFetcherState {
    fetched: Vec<AssetId>,
    preloaded: Vec<AssetId>,
    failing: HashSet<AssetId>,
    payloads: HashMap<AssetId, AssetBytes>,
}

/// In-memory fetcher that records calls
#[derive(Debug, Clone)]
pub struct MockFetcher {
    state: Arc<Mutex<MockFetcherState>>,
    default_payload: AssetBytes,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a mock that serves [`placeholder_glb`] for every identifier
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockFetcherState::default())),
            default_payload: Arc::from(placeholder_glb()),
        }
    }

    /// Make every fetch of `id` fail with a network error
    pub fn fail_on(&self, id: &AssetId) {
        self.state.lock().failing.insert(id.clone());
    }

    /// Serve `bytes` for `id`
    pub fn set_payload(&self, id: &AssetId, bytes: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .payloads
            .insert(id.clone(), Arc::from(bytes.into()));
    }

    /// Every fetch issued so far, in order
    pub fn fetched(&self) -> Vec<AssetId> {
        self.state.lock().fetched.clone()
    }

    /// Number of fetches issued for `id`
    pub fn fetch_count(&self, id: &AssetId) -> usize {
        self.state
            .lock()
            .fetched
            .iter()
            .filter(|fetched| *fetched == id)
            .count()
    }

    /// Every preload hint received so far, in order
    pub fn preloaded(&self) -> Vec<AssetId> {
        self.state.lock().preloaded.clone()
    }

    /// Forget recorded calls, keeping payloads and failures
    pub fn clear_log(&self) {
        let mut state = self.state.lock();
        state.fetched.clear();
        state.preloaded.clear();
    }
}

#[async_trait::async_trait]
impl AssetFetcher for MockFetcher {
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError> {
        let mut state = self.state.lock();
        state.fetched.push(id.clone());

        if state.failing.contains(id) {
            return Err(FetchError::Network(format!("mock failure for {id}")));
        }

        Ok(state
            .payloads
            .get(id)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_payload)))
    }

    fn preload(&self, id: &AssetId) -> Result<(), FetchError> {
        self.state.lock().preloaded.push(id.clone());
        Ok(())
    }
}
