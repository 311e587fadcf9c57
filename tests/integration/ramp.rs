//! Ramp-up tests: floor fill, cooldown-paced growth, ceiling.

use crate::helpers::*;
use futures_util::future::join_all;
use std::time::Duration;
use tokio::time::Instant;

/// Short items drain before the first cooldown window closes, so the pool
/// never grows past its floor.
#[tokio::test(start_paused = true)]
async fn test_floor_reached_instantly() {
    let pool = sleepy_pool(config("floor", 2, 5, 1000));

    let submissions: Vec<_> = (0..10).map(|_| pool.submit(50)).collect();
    assert_eq!(pool.active_workers(), 2);

    let results = join_all(submissions).await;
    assert!(results.iter().all(|r| *r == Ok(50)));

    let stats = pool.stats();
    assert_eq!(stats.workers_spawned, 2);
    assert_eq!(stats.succeeded, 10);
}

/// A sustained backlog adds one worker per cooldown window until the ceiling.
#[tokio::test(start_paused = true)]
async fn test_growth_paced_by_cooldown() {
    let start = Instant::now();
    let pool = sleepy_pool(config("growth", 2, 5, 1000));

    let submissions: Vec<_> = (0..20).map(|_| pool.submit(1500)).collect();
    assert_eq!(pool.active_workers(), 2);

    at(start, 500).await;
    assert_eq!(pool.active_workers(), 2);

    at(start, 1200).await;
    assert_eq!(pool.active_workers(), 3);

    at(start, 2200).await;
    assert_eq!(pool.active_workers(), 4);

    at(start, 3200).await;
    assert_eq!(pool.active_workers(), 5);

    at(start, 4200).await;
    assert_eq!(pool.active_workers(), 5);

    let results = join_all(submissions).await;
    assert_eq!(results.len(), 20);
    assert!(results.iter().all(|r| *r == Ok(1500)));
    assert_eq!(pool.stats().workers_spawned, 5);
}

/// With a zero floor and an empty queue nothing runs; the first submission
/// still gets a worker right away.
#[tokio::test(start_paused = true)]
async fn test_zero_floor_first_submission() {
    let pool = sleepy_pool(config("zero", 0, 3, 60_000));

    assert_eq!(pool.active_workers(), 0);
    assert!(!pool.is_retry_timer_active());

    let submission = pool.submit(20);
    assert_eq!(pool.active_workers(), 1);
    assert!(pool.is_retry_timer_active());

    assert_eq!(submission.await, Ok(20));
    assert_eq!(pool.stats().workers_spawned, 1);
}

/// Zero cooldown lets every submission add a worker, up to the ceiling.
#[tokio::test(start_paused = true)]
async fn test_ceiling_with_zero_cooldown() {
    let pool = sleepy_pool(config("ceiling", 0, 4, 0));

    let submissions: Vec<_> = (0..12).map(|_| pool.submit(100)).collect();
    assert_eq!(pool.active_workers(), 4);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(pool.active_workers(), 4);

    let results = join_all(submissions).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(pool.stats().workers_spawned, 4);
}
