//! Mock async spawner for testing
//!
//! Provides a spawner driven by a virtual clock. Immediate tasks run
//! synchronously; delayed tasks wait until the test advances the clock.

use super::{BoxFuture, TaskHandle, TaskSpawner};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Spawn behavior for MockSpawner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSpawnBehavior {
    /// Drop tasks immediately (don't execute)
    Drop,
    /// Run immediate tasks synchronously, delayed tasks on [`MockSpawner::advance`]
    BlockSync,
}

struct ScheduledTask {
    due: Duration,
    seq: u64,
    cancelled: Arc<AtomicBool>,
    task: BoxFuture<'static, ()>,
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("due", &self.due)
            .field("seq", &self.seq)
            .field("cancelled", &self.cancelled.load(Ordering::SeqCst))
            .finish()
    }
}

#[derive(Debug, Default)]
struct VirtualClock {
    now: Duration,
    next_seq: u64,
    running: bool,
    queue: Vec<ScheduledTask>,
}

/// Mock async spawner for testing
///
/// Time only moves when the test calls [`advance`](Self::advance) or
/// [`run_until_idle`](Self::run_until_idle). Tasks due at the same instant run
/// in the order they were scheduled. Tasks spawned from inside a running task
/// are queued at the current instant and run before the clock moves on.
#[derive(Clone, Debug)]
pub struct MockSpawner {
    behavior: MockSpawnBehavior,
    clock: Arc<Mutex<VirtualClock>>,
}

impl Default for MockSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpawner {
    /// Create a new mock spawner on a virtual clock starting at zero
    pub fn new() -> Self {
        Self::with_behavior(MockSpawnBehavior::BlockSync)
    }

    /// Create a mock spawner with specific behavior
    pub fn with_behavior(behavior: MockSpawnBehavior) -> Self {
        Self {
            behavior,
            clock: Arc::new(Mutex::new(VirtualClock::default())),
        }
    }

    /// Create a mock spawner that drops every task
    pub fn dropping() -> Self {
        Self::with_behavior(MockSpawnBehavior::Drop)
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    /// Number of scheduled tasks that are neither cancelled nor run yet
    pub fn pending_tasks(&self) -> usize {
        self.clock
            .lock()
            .queue
            .iter()
            .filter(|task| !task.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move the clock forward, running every task that falls due
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        self.run_until(target);
    }

    /// Run every outstanding task, moving the clock to the last due time
    pub fn run_until_idle(&self) {
        self.run_until(Duration::MAX);
    }

    fn enqueue(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut clock = self.clock.lock();
        let due = clock.now.saturating_add(delay);
        let seq = clock.next_seq;
        clock.next_seq += 1;
        clock.queue.push(ScheduledTask {
            due,
            seq,
            cancelled: Arc::clone(&cancelled),
            task,
        });
        TaskHandle::new(cancelled)
    }

    fn run_until(&self, target: Duration) {
        loop {
            let next = {
                let mut clock = self.clock.lock();
                clock
                    .queue
                    .retain(|task| !task.cancelled.load(Ordering::SeqCst));

                let index = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.due <= target)
                    .min_by_key(|(_, task)| (task.due, task.seq))
                    .map(|(index, _)| index);

                match index {
                    Some(index) => {
                        let task = clock.queue.swap_remove(index);
                        clock.now = clock.now.max(task.due);
                        clock.running = true;
                        task
                    }
                    None => {
                        if target != Duration::MAX {
                            clock.now = clock.now.max(target);
                        }
                        clock.running = false;
                        break;
                    }
                }
            };

            if !next.cancelled.load(Ordering::SeqCst) {
                futures::executor::block_on(next.task);
            }
            self.clock.lock().running = false;
        }
    }
}

impl TaskSpawner for MockSpawner {
    fn spawn<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.behavior {
            MockSpawnBehavior::Drop => {
                drop(task);
                TaskHandle::finished()
            }
            MockSpawnBehavior::BlockSync => {
                let nested = {
                    let mut clock = self.clock.lock();
                    let nested = clock.running;
                    clock.running = true;
                    nested
                };

                if nested {
                    // block_on cannot be re-entered; run it once the outer task yields
                    return self.enqueue(Duration::ZERO, Box::pin(task));
                }

                futures::executor::block_on(task);
                self.clock.lock().running = false;

                let now = self.now();
                self.run_until(now);
                TaskHandle::finished()
            }
        }
    }

    fn spawn_after<F>(&self, delay: Duration, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.behavior {
            MockSpawnBehavior::Drop => {
                drop(task);
                TaskHandle::finished()
            }
            MockSpawnBehavior::BlockSync => self.enqueue(delay, Box::pin(task)),
        }
    }

    fn runtime_name(&self) -> &'static str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_mock_spawner_drop() {
        let spawner = MockSpawner::dropping();
        let _ = spawner.spawn(async {
            panic!("Should not run");
        });
        let _ = spawner.spawn_after(Duration::from_millis(5), async {
            panic!("Should not run");
        });
        spawner.run_until_idle();
        assert_eq!(spawner.pending_tasks(), 0);
    }

    #[test]
    fn test_mock_spawner_runs_immediately() {
        let spawner = MockSpawner::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();

        spawner.spawn(async move {
            ran_clone.store(true, Ordering::SeqCst);
        });

        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_delayed_tasks_wait_for_clock() {
        let spawner = MockSpawner::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();

        spawner.spawn_after(Duration::from_millis(100), async move {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        });

        spawner.advance(Duration::from_millis(99));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(spawner.pending_tasks(), 1);

        spawner.advance(Duration::from_millis(1));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(spawner.pending_tasks(), 0);
        assert_eq!(spawner.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_delayed_tasks_run_in_due_order() {
        let spawner = MockSpawner::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, delay) in [("late", 30u64), ("early", 10), ("tie-a", 20), ("tie-b", 20)] {
            let order = Arc::clone(&order);
            spawner.spawn_after(Duration::from_millis(delay), async move {
                order.lock().push(label);
            });
        }

        spawner.run_until_idle();
        assert_eq!(*order.lock(), vec!["early", "tie-a", "tie-b", "late"]);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let spawner = MockSpawner::new();
        let handle = spawner.spawn_after(Duration::from_millis(10), async {
            panic!("cancelled task ran");
        });

        assert_eq!(spawner.pending_tasks(), 1);
        handle.cancel();
        assert_eq!(spawner.pending_tasks(), 0);
        spawner.advance(Duration::from_secs(1));
    }

    #[test]
    fn test_nested_spawn_runs_before_clock_moves() {
        let spawner = MockSpawner::new();
        let ran = Arc::new(AtomicBool::new(false));

        let inner_spawner = spawner.clone();
        let ran_clone = ran.clone();
        spawner.spawn_after(Duration::from_millis(10), async move {
            inner_spawner.spawn(async move {
                ran_clone.store(true, Ordering::SeqCst);
            });
        });

        spawner.advance(Duration::from_millis(10));
        assert!(ran.load(Ordering::SeqCst));
    }
}
