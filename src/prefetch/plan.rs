//! Prefetch priority and timing
//!
//! Pure functions: given the catalog, the current selection and the timing
//! knobs, compute which assets are fetched and when. No I/O happens here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{AssetId, Catalog};

/// Delays that shape a prefetch epoch, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchTiming {
    /// Quiet period reserved for the current asset before background work starts
    pub settle_delay_ms: u64,
    /// Spacing between successive priority fetches
    pub stagger_interval_ms: u64,
    /// Spacing between successive background fetches
    pub lower_stagger_interval_ms: u64,
    /// Only neighbours within this catalog distance are prioritized; `None` means all
    pub priority_radius: Option<usize>,
}

impl Default for PrefetchTiming {
    fn default() -> Self {
        Self {
            settle_delay_ms: 800,
            stagger_interval_ms: 150,
            lower_stagger_interval_ms: 250,
            priority_radius: None,
        }
    }
}

impl PrefetchTiming {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn stagger_interval(&self) -> Duration {
        Duration::from_millis(self.stagger_interval_ms)
    }

    pub fn lower_stagger_interval(&self) -> Duration {
        Duration::from_millis(self.lower_stagger_interval_ms)
    }
}

/// Neighbours of `current`, nearest first, backward before forward at equal distance.
///
/// An unknown or absent `current` is treated as sitting just before the first
/// entry, so the whole catalog comes back in order.
pub fn priority_order(
    catalog: &Catalog,
    current: Option<&AssetId>,
    radius: Option<usize>,
) -> Vec<AssetId> {
    let len = catalog.len() as isize;
    let index = current
        .and_then(|id| catalog.position(id))
        .map_or(-1, |i| i as isize);
    let max_distance = radius.map_or(len, |r| r.min(catalog.len()) as isize);

    let mut order = Vec::with_capacity(catalog.len());
    for distance in 1..=max_distance {
        let before = index - distance;
        let after = index + distance;

        if before >= 0 {
            if let Some(id) = catalog.get(before as usize) {
                order.push(id.clone());
            }
        }
        if after < len {
            if let Some(id) = catalog.get(after as usize) {
                order.push(id.clone());
            }
        }
    }
    order
}

/// Which stage of an epoch a fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchTier {
    /// The current asset, fetched as soon as the epoch starts
    Immediate,
    /// Catalog neighbours, after the settle delay
    Priority,
    /// Everything else, after all priority fetches
    Background,
}

/// One fetch in an epoch's plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFetch {
    pub id: AssetId,
    pub tier: FetchTier,
    /// Delay from the start of the epoch
    pub delay: Duration,
}

/// The full schedule of one epoch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPlan {
    current: Option<AssetId>,
    entries: Vec<PlannedFetch>,
}

impl FetchPlan {
    pub fn build(catalog: &Catalog, current: Option<&AssetId>, timing: &PrefetchTiming) -> Self {
        let mut entries = Vec::with_capacity(catalog.len() + 1);

        if let Some(id) = current {
            entries.push(PlannedFetch {
                id: id.clone(),
                tier: FetchTier::Immediate,
                delay: Duration::ZERO,
            });
        }

        let settle = timing.settle_delay();
        let stagger = timing.stagger_interval();
        let priority = priority_order(catalog, current, timing.priority_radius);

        for (position, id) in priority.iter().enumerate() {
            if Some(id) == current {
                continue;
            }
            entries.push(PlannedFetch {
                id: id.clone(),
                tier: FetchTier::Priority,
                delay: settle + stagger.saturating_mul(position as u32),
            });
        }

        let background_start = settle + stagger.saturating_mul(priority.len() as u32);
        let lower = timing.lower_stagger_interval();
        for (index, id) in catalog.iter().enumerate() {
            if Some(id) == current || priority.contains(id) {
                continue;
            }
            entries.push(PlannedFetch {
                id: id.clone(),
                tier: FetchTier::Background,
                delay: background_start + lower.saturating_mul(index as u32),
            });
        }

        Self {
            current: current.cloned(),
            entries,
        }
    }

    /// The selection this plan was built for
    pub fn current(&self) -> Option<&AssetId> {
        self.current.as_ref()
    }

    /// Every planned fetch, immediate first, then in scheduling order
    pub fn entries(&self) -> &[PlannedFetch] {
        &self.entries
    }

    /// Planned fetches of one tier
    pub fn tier(&self, tier: FetchTier) -> impl Iterator<Item = &PlannedFetch> {
        self.entries.iter().filter(move |entry| entry.tier == tier)
    }

    /// Identifiers that wait on a timer, in scheduling order
    pub fn timed_ids(&self) -> Vec<&AssetId> {
        self.entries
            .iter()
            .filter(|entry| entry.tier != FetchTier::Immediate)
            .map(|entry| &entry.id)
            .collect()
    }

    /// Delay of the first planned fetch of `id`
    pub fn delay_of(&self, id: &AssetId) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| entry.delay)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
