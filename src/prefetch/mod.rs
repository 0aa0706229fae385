//! Background prefetching of catalog models
//!
//! Warms the fetch adapter's caches for the model being viewed right away,
//! then for its catalog neighbours and finally for everything else, spacing
//! requests out so they never compete with the primary load.
//!
//! Each selection starts a new *epoch*. Starting an epoch cancels every timer
//! the previous epoch left behind before any new timer exists, and gives the
//! new epoch its own visited set so no asset is requested twice within it.

pub mod plan;

pub use plan::{priority_order, FetchPlan, FetchTier, PlannedFetch, PrefetchTiming};

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::{AssetId, Catalog};
use crate::fetch::AssetFetcher;
use crate::runtime::{TaskHandle, TaskSpawner};

type VisitedSet = Arc<Mutex<HashSet<AssetId>>>;

struct Epoch {
    number: u64,
    plan: FetchPlan,
    visited: VisitedSet,
    timers: Vec<TaskHandle>,
}

impl Epoch {
    fn cancel(self) {
        log::trace!(
            "Cancelling prefetch epoch {} ({} timers)",
            self.number,
            self.timers.len()
        );
        for timer in self.timers {
            timer.cancel();
        }
    }
}

/// Schedules background fetches around the current selection
pub struct PrefetchScheduler<S: TaskSpawner, F: AssetFetcher + 'static> {
    spawner: S,
    fetcher: Arc<F>,
    catalog: Catalog,
    timing: PrefetchTiming,
    epoch: Option<Epoch>,
    epochs_started: u64,
}

impl<S: TaskSpawner, F: AssetFetcher + 'static> PrefetchScheduler<S, F> {
    pub fn new(spawner: S, fetcher: Arc<F>, catalog: Catalog, timing: PrefetchTiming) -> Self {
        Self {
            spawner,
            fetcher,
            catalog,
            timing,
            epoch: None,
            epochs_started: 0,
        }
    }

    /// Restart prefetching around `current`.
    ///
    /// The previous epoch's timers are cancelled first. Calling this again with
    /// the selection of the running epoch changes nothing and returns its plan.
    pub fn reschedule(&mut self, current: Option<&AssetId>) -> &FetchPlan {
        let active = match self.epoch.take() {
            Some(active) if active.plan.current() == current => active,
            previous => {
                if let Some(previous) = previous {
                    previous.cancel();
                }
                self.start_epoch(current)
            }
        };
        &self.epoch.insert(active).plan
    }

    /// Cancel the running epoch without starting a new one
    pub fn cancel(&mut self) {
        if let Some(epoch) = self.epoch.take() {
            epoch.cancel();
        }
    }

    fn start_epoch(&mut self, current: Option<&AssetId>) -> Epoch {
        self.epochs_started += 1;
        let number = self.epochs_started;
        let plan = FetchPlan::build(&self.catalog, current, &self.timing);
        let visited: VisitedSet = Arc::new(Mutex::new(HashSet::new()));
        let mut timers = Vec::with_capacity(plan.len());

        log::debug!(
            "Prefetch epoch {} for {} ({} planned fetches)",
            number,
            current.map_or("<none>", AssetId::as_str),
            plan.len()
        );

        for entry in plan.entries() {
            match entry.tier {
                FetchTier::Immediate => {
                    if visited.lock().insert(entry.id.clone()) {
                        self.spawner.spawn(prefetch_one(
                            Arc::clone(&self.fetcher),
                            entry.id.clone(),
                            number,
                        ));
                    }
                }
                FetchTier::Priority | FetchTier::Background => {
                    let task = self.timer_task(number, entry.id.clone(), Arc::clone(&visited));
                    timers.push(self.spawner.spawn_after(entry.delay, task));
                }
            }
        }

        Epoch {
            number,
            plan,
            visited,
            timers,
        }
    }

    fn timer_task(
        &self,
        epoch: u64,
        id: AssetId,
        visited: VisitedSet,
    ) -> impl Future<Output = ()> + Send + 'static {
        let spawner = self.spawner.clone();
        let fetcher = Arc::clone(&self.fetcher);

        async move {
            let first_visit = visited.lock().insert(id.clone());
            if !first_visit {
                log::trace!("{} already requested in epoch {}", id, epoch);
                return;
            }
            // The fetch outlives the timer: cancelling an epoch never aborts a request in flight
            spawner.spawn(prefetch_one(fetcher, id, epoch));
        }
    }

    /// Plan of the running epoch
    pub fn plan(&self) -> Option<&FetchPlan> {
        self.epoch.as_ref().map(|epoch| &epoch.plan)
    }

    /// Selection of the running epoch
    pub fn current(&self) -> Option<&AssetId> {
        self.epoch.as_ref().and_then(|epoch| epoch.plan.current())
    }

    /// Number of the running epoch, 0 before the first reschedule or after cancel
    pub fn epoch(&self) -> u64 {
        self.epoch.as_ref().map_or(0, |epoch| epoch.number)
    }

    /// Timers the running epoch created, fired or not
    pub fn scheduled_timers(&self) -> usize {
        self.epoch.as_ref().map_or(0, |epoch| epoch.timers.len())
    }

    /// Snapshot of the running epoch's visited set
    pub fn visited(&self) -> HashSet<AssetId> {
        self.epoch
            .as_ref()
            .map(|epoch| epoch.visited.lock().clone())
            .unwrap_or_default()
    }

    pub fn is_visited(&self, id: &AssetId) -> bool {
        self.epoch
            .as_ref()
            .is_some_and(|epoch| epoch.visited.lock().contains(id))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn timing(&self) -> &PrefetchTiming {
        &self.timing
    }
}

impl<S: TaskSpawner, F: AssetFetcher + 'static> Drop for PrefetchScheduler<S, F> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Fetch one asset and hint the adapter to warm its scene cache; errors are only logged
async fn prefetch_one<F: AssetFetcher + ?Sized>(fetcher: Arc<F>, id: AssetId, epoch: u64) {
    match fetcher.fetch(&id).await {
        Ok(bytes) => {
            log::debug!("Prefetched {} ({} bytes, epoch {})", id, bytes.len(), epoch);
            if let Err(err) = fetcher.preload(&id) {
                log::trace!("Preload hint for {} ignored: {}", id, err);
            }
        }
        Err(err) => {
            log::debug!("Prefetch of {} failed in epoch {}: {}", id, epoch, err);
        }
    }
}
