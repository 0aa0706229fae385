//! Viewer orchestration
//!
//! Ties one selected model to the prefetcher, the load state shown by the
//! loading indicator, the attached scene and the persisted camera framing.

pub mod loading;

pub use loading::{IndicatorKind, IndicatorSize, LoadState, LoadingIndicator};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::camera::{CameraPose, KeyValueStore, OrbitLimits, PosePersistence};
use crate::catalog::AssetId;
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::fetch::AssetFetcher;
use crate::prefetch::PrefetchScheduler;
use crate::runtime::{TaskHandle, TaskSpawner};
use crate::scene::SceneModel;

/// Viewport height in CSS pixels for the regular layout
pub const VIEWPORT_HEIGHT: u32 = 500;
/// Viewport height in CSS pixels for the compact layout
pub const COMPACT_VIEWPORT_HEIGHT: u32 = 200;
/// Text shown when nothing is selected
pub const PLACEHOLDER_MESSAGE: &str = "Select a model";

/// What the rendering layer should draw
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerSurface {
    /// Nothing selected
    Placeholder {
        height_px: u32,
        message: &'static str,
    },
    /// A model is selected; `indicator` is present while it loads
    Viewport {
        height_px: u32,
        indicator: Option<LoadingIndicator>,
        camera: CameraPose,
    },
}

#[derive(Debug)]
struct LoadTracker {
    selection: Option<AssetId>,
    generation: u64,
    state: LoadState,
    notified: bool,
    scene: Option<Arc<SceneModel>>,
}

/// Displays one model at a time and keeps the rest warm in the background.
///
/// Every method takes `&self`, so a new selection can land while an earlier
/// `load_selected` is still fetching; the earlier load then completes without
/// touching the viewer.
pub struct ModelViewer<S: TaskSpawner, F: AssetFetcher + 'static, K: KeyValueStore> {
    spawner: S,
    fetcher: Arc<F>,
    prefetch: Mutex<PrefetchScheduler<S, F>>,
    poses: PosePersistence<K>,
    orbit: OrbitLimits,
    initial_pose: CameraPose,
    compact: bool,
    load_settle_delay: Duration,
    load: Arc<RwLock<LoadTracker>>,
    settle_timer: Mutex<Option<TaskHandle>>,
}

impl<S: TaskSpawner, F: AssetFetcher + 'static, K: KeyValueStore> ModelViewer<S, F, K> {
    /// Build a viewer. The saved camera pose is read once, here.
    pub fn new(config: &ViewerConfig, spawner: S, fetcher: Arc<F>, store: K) -> Result<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let prefetch =
            PrefetchScheduler::new(spawner.clone(), Arc::clone(&fetcher), catalog, config.prefetch);

        let poses = PosePersistence::new(store, config.storage_key.clone());
        let initial_pose = poses.load().unwrap_or_default();

        Ok(Self {
            spawner,
            fetcher,
            prefetch: Mutex::new(prefetch),
            poses,
            orbit: config.orbit,
            initial_pose,
            compact: config.compact,
            load_settle_delay: config.load_settle_delay(),
            load: Arc::new(RwLock::new(LoadTracker {
                selection: None,
                generation: 0,
                state: LoadState::Idle,
                notified: false,
                scene: None,
            })),
            settle_timer: Mutex::new(None),
        })
    }

    /// Change the selected model. Returns `false` if it was already selected.
    pub fn select(&self, selection: Option<AssetId>) -> bool {
        // Held across the switch so epochs start in selection order
        let mut prefetch = self.prefetch.lock();

        {
            let mut load = self.load.write();
            if load.selection == selection {
                return false;
            }
            load.selection = selection.clone();
            load.generation += 1;
            load.state = if selection.is_some() {
                LoadState::Pending
            } else {
                LoadState::Idle
            };
            load.notified = false;
            load.scene = None;
        }

        if let Some(timer) = self.settle_timer.lock().take() {
            timer.cancel();
        }

        log::debug!(
            "Selected {}",
            selection.as_ref().map_or("<none>", AssetId::as_str)
        );
        prefetch.reschedule(selection.as_ref());
        true
    }

    /// Fetch, parse and attach the selected model.
    ///
    /// On failure the state becomes [`LoadState::Failed`] and the indicator stays up.
    /// If the selection changes before the load finishes, the parsed scene is
    /// returned but neither attached nor reflected in [`load_state`](Self::load_state).
    pub async fn load_selected(&self) -> Result<Arc<SceneModel>> {
        let (id, generation) = {
            let load = self.load.read();
            let id = load.selection.clone().ok_or(ViewerError::NothingSelected)?;
            (id, load.generation)
        };

        if let Some(scene) = self.fetcher.cached_scene(&id) {
            self.attach(generation, Arc::clone(&scene));
            return Ok(scene);
        }

        self.set_state(generation, LoadState::Fetching);
        let bytes = match self.fetcher.fetch(&id).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.set_state(generation, LoadState::Failed(err.to_string()));
                return Err(err.into());
            }
        };

        self.set_state(generation, LoadState::Attaching);
        let scene = match SceneModel::from_glb(id, &bytes) {
            Ok(scene) => Arc::new(scene),
            Err(err) => {
                self.set_state(generation, LoadState::Failed(err.to_string()));
                return Err(err.into());
            }
        };

        self.attach(generation, Arc::clone(&scene));
        Ok(scene)
    }

    /// Signal that `id` is fetched and attached to the scene graph.
    ///
    /// The indicator hides after the settle delay, once per selection. Stale or
    /// repeated notifications are ignored and return `false`.
    pub fn notify_attached(&self, id: &AssetId) -> bool {
        let generation = {
            let mut load = self.load.write();
            if load.selection.as_ref() != Some(id) || load.notified || !load.state.is_loading() {
                return false;
            }
            load.notified = true;
            load.state = LoadState::Settling;
            load.generation
        };

        let tracker = Arc::clone(&self.load);
        let timer = self.spawner.spawn_after(self.load_settle_delay, async move {
            let mut load = tracker.write();
            if load.generation == generation && load.state == LoadState::Settling {
                load.state = LoadState::Ready;
            }
        });
        *self.settle_timer.lock() = Some(timer);
        true
    }

    fn attach(&self, generation: u64, scene: Arc<SceneModel>) {
        {
            let mut load = self.load.write();
            if load.generation != generation {
                return;
            }
            load.scene = Some(Arc::clone(&scene));
        }
        self.notify_attached(&scene.id);
    }

    fn set_state(&self, generation: u64, state: LoadState) {
        let mut load = self.load.write();
        if load.generation == generation {
            load.state = state;
        }
    }

    /// Persist the camera after the user finishes an orbit/zoom/pan gesture
    pub fn on_interaction_end(&self, pose: &CameraPose) {
        self.poses.save(pose);
    }

    /// What to draw right now
    pub fn surface(&self) -> ViewerSurface {
        let height_px = if self.compact {
            COMPACT_VIEWPORT_HEIGHT
        } else {
            VIEWPORT_HEIGHT
        };

        if self.load.read().selection.is_none() {
            return ViewerSurface::Placeholder {
                height_px,
                message: PLACEHOLDER_MESSAGE,
            };
        }

        ViewerSurface::Viewport {
            height_px,
            indicator: self.is_loading().then(LoadingIndicator::default),
            camera: self.initial_pose,
        }
    }

    pub fn selection(&self) -> Option<AssetId> {
        self.load.read().selection.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.load.read().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.load.read().state.is_loading()
    }

    /// The attached scene of the current selection
    pub fn scene(&self) -> Option<Arc<SceneModel>> {
        self.load.read().scene.clone()
    }

    /// Camera pose the viewport starts from: saved framing or defaults
    pub fn initial_pose(&self) -> CameraPose {
        self.initial_pose
    }

    pub fn orbit(&self) -> &OrbitLimits {
        &self.orbit
    }

    /// Locks the prefetch scheduler; release the guard before calling [`select`](Self::select)
    pub fn prefetch(&self) -> MutexGuard<'_, PrefetchScheduler<S, F>> {
        self.prefetch.lock()
    }

    pub fn poses(&self) -> &PosePersistence<K> {
        &self.poses
    }
}
