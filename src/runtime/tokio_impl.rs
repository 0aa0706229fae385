//! Tokio async runtime implementation
//!
//! Provides integration with the Tokio async runtime. Must be used from
//! inside a Tokio runtime context.

use super::{TaskHandle, TaskSpawner};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tokio-based async spawner
///
/// Spawns tasks on the Tokio runtime; delayed tasks sleep on `tokio::time`.
#[derive(Clone, Debug, Default, Copy)]
pub struct TokioSpawner;

impl TokioSpawner {
    /// Create a new Tokio spawner
    pub fn new() -> Self {
        Self
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        TaskHandle::new(Arc::new(AtomicBool::new(false))).with_abort(move || handle.abort())
    }

    fn spawn_after<F>(&self, delay: Duration, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // abort() only takes effect at the next await point
            if !flag.load(Ordering::SeqCst) {
                task.await;
            }
        });

        TaskHandle::new(cancelled).with_abort(move || handle.abort())
    }

    fn runtime_name(&self) -> &'static str {
        "Tokio"
    }
}
