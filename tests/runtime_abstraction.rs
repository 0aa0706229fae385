//! Integration tests for async runtime abstraction

use showcase_viewer::{MockSpawner, TaskSpawner};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_mock_spawner_integration() {
    let spawner = MockSpawner::new();

    let executed = Arc::new(AtomicBool::new(false));
    let executed_clone = Arc::clone(&executed);

    spawner.spawn(async move {
        executed_clone.store(true, Ordering::SeqCst);
    });

    // Immediate tasks run synchronously
    assert!(executed.load(Ordering::SeqCst));
}

#[test]
fn test_spawner_trait_bound() {
    fn schedule<S: TaskSpawner>(spawner: &S, counter: Arc<AtomicUsize>) {
        spawner.spawn_after(Duration::from_millis(10), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    let spawner = MockSpawner::new();
    let counter = Arc::new(AtomicUsize::new(0));
    schedule(&spawner, Arc::clone(&counter));

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    spawner.run_until_idle();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(spawner.now(), Duration::from_millis(10));
}

#[test]
fn test_dropped_handle_detaches() {
    let spawner = MockSpawner::new();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    drop(spawner.spawn_after(Duration::from_millis(5), async move {
        flag.store(true, Ordering::SeqCst);
    }));

    spawner.advance(Duration::from_millis(5));
    assert!(ran.load(Ordering::SeqCst));
}

#[cfg(feature = "runtime-tokio")]
#[tokio::test(start_paused = true)]
async fn test_tokio_spawner_cancel_before_fire() {
    use showcase_viewer::TokioSpawner;

    let spawner = TokioSpawner::new();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    let handle = spawner.spawn_after(Duration::from_millis(800), async move {
        flag.store(true, Ordering::SeqCst);
    });
    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.cancel();
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(!ran.load(Ordering::SeqCst));
}
