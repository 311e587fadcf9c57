//! Error isolation tests: one failing item never affects its neighbours.

use crate::helpers::*;
use futures_util::future::join_all;
use render_autoscale::{processor_fn, AdaptiveWorkerPool};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
struct RenderRejected {
    item: u32,
    reason: String,
}

/// Item #3 fails; the rest succeed, #3 carries its own error value, and the
/// worker count is untouched.
#[tokio::test(start_paused = true)]
async fn test_failed_item_is_isolated() {
    let processor = processor_fn(|item: u32| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if item == 3 {
            Err(RenderRejected {
                item,
                reason: "template missing".to_string(),
            })
        } else {
            Ok(item * 10)
        }
    });
    let pool = AdaptiveWorkerPool::new(processor, config("isolation", 2, 5, 1000)).unwrap();

    let start = Instant::now();
    let submissions: Vec<_> = (1..=6).map(|i| pool.submit(i)).collect();
    assert_eq!(pool.active_workers(), 2);

    // #3 fails at 40ms; both workers then pick up #5 and #6
    at(start, 45).await;
    let stats = pool.stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.active_workers, 2);
    assert_eq!(stats.workers_spawned, 2);
    assert_eq!(stats.workers_disposed, 0);

    let results = join_all(submissions).await;

    assert_eq!(results[0], Ok(10));
    assert_eq!(results[1], Ok(20));
    assert_eq!(
        results[2],
        Err(RenderRejected {
            item: 3,
            reason: "template missing".to_string(),
        })
    );
    assert_eq!(results[3], Ok(40));
    assert_eq!(results[4], Ok(50));
    assert_eq!(results[5], Ok(60));

    let stats = pool.stats();
    assert_eq!(stats.succeeded, 5);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.completed(), 6);
    assert_eq!(stats.workers_spawned, 2);
}

/// A panicking processor call fails only its own submission.
#[tokio::test(start_paused = true)]
async fn test_panic_is_isolated() {
    let processor = processor_fn(|item: u32| async move {
        if item == 2 {
            panic!("renderer crashed on item {}", item);
        }
        Ok::<_, String>(item)
    });
    let pool = AdaptiveWorkerPool::new(processor, config("panic", 1, 1, 0)).unwrap();

    let first = pool.submit(1);
    let second = tokio::spawn(pool.submit(2));
    let third = pool.submit(3);

    assert_eq!(first.await, Ok(1));
    assert!(second.await.unwrap_err().is_panic());
    assert_eq!(third.await, Ok(3));

    let stats = pool.stats();
    assert_eq!(stats.panicked, 1);
    assert_eq!(stats.succeeded, 2);
}

/// Dropping a submission does not cancel the work or stall the queue.
#[tokio::test(start_paused = true)]
async fn test_abandoned_submission_does_not_block_queue() {
    let pool = sleepy_pool(config("abandoned", 1, 1, 0));

    drop(pool.submit(40));
    let kept = pool.submit(10);

    assert_eq!(kept.await, Ok(10));
    let stats = pool.stats();
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.succeeded, 2);
}
