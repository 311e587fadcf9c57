//! Shrink and reuse tests: idle disposal, retry timer shutdown, restart.

use crate::helpers::*;
use futures_util::future::join_all;
use render_autoscale::PoolConfig;
use std::time::Duration;
use tokio::time::sleep;

fn idle_config(name: &str, min: usize, max: usize, idle_ms: u64) -> PoolConfig {
    config(name, min, max, 0)
        .with_worker_reacquire_delay(Duration::from_millis(100))
        .with_worker_max_idle(Duration::from_millis(idle_ms))
}

/// Workers above the floor linger for the idle window, then leave.
#[tokio::test(start_paused = true)]
async fn test_idle_workers_shrink_to_zero() {
    let pool = sleepy_pool(idle_config("shrink", 1, 4, 300));

    let submissions: Vec<_> = (0..8).map(|_| pool.submit(100)).collect();
    assert_eq!(pool.active_workers(), 4);
    join_all(submissions).await;

    // Inside the idle window the extra workers are still around
    sleep(Duration::from_millis(100)).await;
    assert!(pool.active_workers() > 1);

    sleep(Duration::from_millis(1000)).await;
    let stats = pool.stats();
    assert_eq!(stats.active_workers, 0);
    assert_eq!(stats.workers_disposed, stats.workers_spawned);
    assert!(!pool.is_retry_timer_active());
}

/// Workers at the floor leave as soon as the queue is empty.
#[tokio::test(start_paused = true)]
async fn test_floor_workers_leave_when_queue_empty() {
    let pool = sleepy_pool(idle_config("floor-exit", 2, 2, 60_000));

    let submissions: Vec<_> = (0..4).map(|_| pool.submit(10)).collect();
    join_all(submissions).await;

    sleep(Duration::from_millis(1)).await;
    assert_eq!(pool.active_workers(), 0);
}

/// The retry timer runs only while items are waiting.
#[tokio::test(start_paused = true)]
async fn test_retry_timer_follows_backlog() {
    let pool = sleepy_pool(
        idle_config("timer", 1, 1, 200).with_spawn_retry_interval(Duration::from_millis(50)),
    );
    assert!(!pool.is_retry_timer_active());

    let submissions: Vec<_> = (0..3).map(|_| pool.submit(100)).collect();
    assert!(pool.is_retry_timer_active());

    sleep(Duration::from_millis(150)).await;
    assert!(pool.is_retry_timer_active());
    assert_eq!(pool.pending_count(), 1);

    join_all(submissions).await;
    sleep(Duration::from_millis(100)).await;
    assert!(!pool.is_retry_timer_active());
    assert_eq!(pool.pending_count(), 0);
}

/// After a full idle-out the pool accepts work again.
#[tokio::test(start_paused = true)]
async fn test_pool_reusable_after_idle_out() {
    let pool = sleepy_pool(idle_config("reuse", 0, 2, 500));

    let first: Vec<_> = (0..4).map(|_| pool.submit(100)).collect();
    join_all(first).await;

    sleep(Duration::from_secs(2)).await;
    assert_eq!(pool.active_workers(), 0);
    assert!(!pool.is_retry_timer_active());
    let spawned_before = pool.stats().workers_spawned;

    let second = pool.submit(30);
    assert_eq!(pool.active_workers(), 1);
    assert_eq!(second.await, Ok(30));
    assert_eq!(pool.stats().workers_spawned, spawned_before + 1);

    let stats = pool.stats();
    assert_eq!(stats.submitted, 5);
    assert_eq!(stats.succeeded, 5);
    assert_eq!(stats.outstanding(), 0);
}
