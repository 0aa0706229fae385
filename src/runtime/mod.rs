//! Async runtime abstraction for timer-driven work
//!
//! This module provides traits and implementations for spawning tasks now or
//! after a delay, so the prefetcher and the viewer can run on tokio in
//! production and on a virtual clock in tests.

pub mod mock;
#[cfg(feature = "runtime-tokio")]
pub mod tokio_impl;

use std::fmt::{self, Debug};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A boxed future that can be sent across threads
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handle to a spawned task.
///
/// Dropping the handle detaches the task; only [`TaskHandle::cancel`] stops it.
/// A delayed task that is cancelled before its timer fires never runs.
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl TaskHandle {
    /// Create a handle around a shared cancellation flag
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            abort: None,
        }
    }

    /// Handle for a task that already ran to completion
    pub fn finished() -> Self {
        Self::new(Arc::new(AtomicBool::new(false)))
    }

    /// Attach a runtime-specific abort hook, invoked on cancel
    pub fn with_abort(mut self, abort: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.abort = Some(Box::new(abort));
        self
    }

    /// Cancel the task
    pub fn cancel(mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = self.abort.take() {
            abort();
        }
    }

    /// Check whether the task was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .field("abortable", &self.abort.is_some())
            .finish()
    }
}

/// Async task spawner trait
///
/// Abstracts "run this now" and "run this after a delay" over whichever
/// executor drives the viewer.
///
/// # Example
/// ```ignore
/// let spawner = TokioSpawner::new();
/// let handle = spawner.spawn_after(Duration::from_millis(150), async {
///     // runs unless cancelled first
/// });
/// handle.cancel();
/// ```
pub trait TaskSpawner: Send + Sync + Clone + Debug + 'static {
    /// Spawn a task that starts immediately
    fn spawn<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawn a task that starts after `delay` unless cancelled first
    fn spawn_after<F>(&self, delay: Duration, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static;

    /// Get the name of this runtime (for debugging)
    fn runtime_name(&self) -> &'static str;
}

// Re-export implementations
pub use mock::MockSpawner;

#[cfg(feature = "runtime-tokio")]
pub use tokio_impl::TokioSpawner;
