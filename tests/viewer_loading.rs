//! Integration tests for the viewer's load lifecycle

use futures::channel::oneshot;
use futures::executor::block_on;
use parking_lot::Mutex;
use showcase_viewer::{
    AssetBytes, AssetFetcher, AssetId, CachedFetcher, FetchError, LoadState, MemoryStore,
    MockFetcher, MockSpawner, ModelViewer, ViewerConfig, ViewerError, ViewerSurface,
};
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

fn id(raw: &str) -> AssetId {
    AssetId::parse(raw).unwrap()
}

fn viewer_with(
    fetcher: MockFetcher,
) -> (ModelViewer<MockSpawner, MockFetcher, MemoryStore>, MockSpawner) {
    let spawner = MockSpawner::new();
    let viewer = ModelViewer::new(
        &ViewerConfig::default(),
        spawner.clone(),
        Arc::new(fetcher),
        MemoryStore::new(),
    )
    .unwrap();
    (viewer, spawner)
}

#[test]
fn test_load_hides_indicator_after_settle() {
    let (viewer, spawner) = viewer_with(MockFetcher::new());
    viewer.select(Some(id("/X_Egg.glb")));
    assert_eq!(viewer.load_state(), LoadState::Pending);

    let scene = block_on(viewer.load_selected()).unwrap();
    assert_eq!(scene.id, id("/X_Egg.glb"));
    assert_eq!(viewer.scene(), Some(scene));
    assert_eq!(viewer.load_state(), LoadState::Settling);

    spawner.advance(Duration::from_millis(100));
    assert_eq!(viewer.load_state(), LoadState::Ready);
    match viewer.surface() {
        ViewerSurface::Viewport { indicator, .. } => assert!(indicator.is_none()),
        other => panic!("unexpected surface {other:?}"),
    }
}

#[test]
fn test_failed_load_keeps_indicator() {
    let fetcher = MockFetcher::new();
    fetcher.fail_on(&id("/X_Bacon.glb"));
    let (viewer, spawner) = viewer_with(fetcher);

    viewer.select(Some(id("/X_Bacon.glb")));
    let err = block_on(viewer.load_selected()).unwrap_err();
    assert!(matches!(err, ViewerError::Fetch(_)));

    spawner.advance(Duration::from_secs(5));
    assert!(viewer.load_state().is_failed());
    assert!(viewer.is_loading());
}

#[test]
fn test_unparseable_model_fails() {
    let fetcher = MockFetcher::new();
    fetcher.set_payload(&id("/broken.glb"), b"not a glb".to_vec());
    let (viewer, _spawner) = viewer_with(fetcher);

    viewer.select(Some(id("/broken.glb")));
    let err = block_on(viewer.load_selected()).unwrap_err();
    assert!(matches!(err, ViewerError::Scene(_)));
    assert!(viewer.is_loading());
}

#[test]
fn test_switch_during_settle_ignores_stale_timer() {
    let (viewer, spawner) = viewer_with(MockFetcher::new());

    viewer.select(Some(id("/X_Egg.glb")));
    block_on(viewer.load_selected()).unwrap();
    spawner.advance(Duration::from_millis(50));

    viewer.select(Some(id("/X_Frango.glb")));
    spawner.advance(Duration::from_millis(100));

    // The egg's debounce never flips the new selection to ready
    assert_eq!(viewer.load_state(), LoadState::Pending);
    assert!(viewer.scene().is_none());
    assert!(!viewer.notify_attached(&id("/X_Egg.glb")));
}

#[test]
fn test_load_without_selection() {
    let (viewer, _spawner) = viewer_with(MockFetcher::new());
    assert!(matches!(
        block_on(viewer.load_selected()),
        Err(ViewerError::NothingSelected)
    ));
}

#[test]
fn test_deselect_shows_placeholder() {
    let (viewer, _spawner) = viewer_with(MockFetcher::new());
    viewer.select(Some(id("/X_Egg.glb")));
    viewer.select(None);

    assert_eq!(viewer.load_state(), LoadState::Idle);
    assert!(matches!(viewer.surface(), ViewerSurface::Placeholder { .. }));
}

#[test]
fn test_prefetched_scene_attaches_without_refetch() {
    let spawner = MockSpawner::new();
    let inner = MockFetcher::new();
    let fetcher = Arc::new(CachedFetcher::new(inner.clone(), 1024 * 1024));
    let viewer = ModelViewer::new(
        &ViewerConfig::default(),
        spawner.clone(),
        Arc::clone(&fetcher),
        MemoryStore::new(),
    )
    .unwrap();

    let egg = id("/X_Egg.glb");
    viewer.select(Some(egg.clone()));
    // The immediate prefetch already parsed the model
    assert!(fetcher.cached_scene(&egg).is_some());

    block_on(viewer.load_selected()).unwrap();
    assert_eq!(inner.fetch_count(&egg), 1);
    assert_eq!(viewer.load_state(), LoadState::Settling);
}

/// Holds back the next fetch of one asset until the test releases it
#[derive(Clone, Default)]
struct GatedFetcher {
    inner: MockFetcher,
    gate: Arc<Mutex<Option<(AssetId, oneshot::Receiver<()>)>>>,
}

impl GatedFetcher {
    fn hold_next(&self, id: &AssetId) -> oneshot::Sender<()> {
        let (release, held) = oneshot::channel();
        *self.gate.lock() = Some((id.clone(), held));
        release
    }
}

#[async_trait::async_trait]
impl AssetFetcher for GatedFetcher {
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError> {
        let held = {
            let mut gate = self.gate.lock();
            match gate.take() {
                Some((gated, held)) if &gated == id => Some(held),
                other => {
                    *gate = other;
                    None
                }
            }
        };
        if let Some(held) = held {
            let _ = held.await;
        }
        self.inner.fetch(id).await
    }
}

#[test]
fn test_switch_during_fetch_discards_stale_load() {
    let spawner = MockSpawner::new();
    let fetcher = GatedFetcher::default();
    let viewer = ModelViewer::new(
        &ViewerConfig::default(),
        spawner.clone(),
        Arc::new(fetcher.clone()),
        MemoryStore::new(),
    )
    .unwrap();

    let egg = id("/X_Egg.glb");
    let frango = id("/X_Frango.glb");
    viewer.select(Some(egg.clone()));
    let release = fetcher.hold_next(&egg);

    let mut load = Box::pin(viewer.load_selected());
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    assert!(matches!(load.as_mut().poll(&mut cx), Poll::Pending));
    assert_eq!(viewer.load_state(), LoadState::Fetching);

    // Switch while the egg is still in flight
    assert!(viewer.select(Some(frango.clone())));
    release.send(()).unwrap();
    let stale = block_on(load).unwrap();
    assert_eq!(stale.id, egg);

    assert!(viewer.scene().is_none());
    assert_eq!(viewer.load_state(), LoadState::Pending);
    spawner.advance(Duration::from_millis(500));
    assert!(viewer.is_loading());
    assert_eq!(viewer.selection(), Some(frango.clone()));

    // The new selection still loads normally
    let scene = block_on(viewer.load_selected()).unwrap();
    assert_eq!(scene.id, frango);
    assert_eq!(viewer.load_state(), LoadState::Settling);
}
