//! Metrics wiring tests.

use crate::helpers::*;
use futures_util::future::join_all;
use render_autoscale::{processor_fn, AdaptiveWorkerPool, PoolMetrics};
use std::sync::Arc;
use std::time::Duration;

fn sample(export: &str, name: &str, labels: &[&str]) -> Option<f64> {
    export
        .lines()
        .filter(|line| line.starts_with(name) && !line.starts_with('#'))
        .filter(|line| labels.iter().all(|label| line.contains(label)))
        .find_map(|line| line.rsplit(' ').next()?.parse().ok())
}

#[tokio::test(start_paused = true)]
async fn test_pool_records_metrics() {
    let metrics = Arc::new(PoolMetrics::new().unwrap());
    let processor = processor_fn(|item: u32| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if item % 4 == 0 {
            Err(format!("item {} rejected", item))
        } else {
            Ok(item)
        }
    });
    let pool = AdaptiveWorkerPool::new(processor, config("metered", 2, 2, 0))
        .unwrap()
        .with_metrics(Arc::clone(&metrics));

    let submissions: Vec<_> = (1..=8).map(|i| pool.submit(i)).collect();
    join_all(submissions).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    let export = metrics.export();
    let pool_label = "pool=\"metered\"";

    assert_eq!(
        sample(&export, "autoscale_items_total", &[pool_label, "status=\"success\""]),
        Some(6.0)
    );
    assert_eq!(
        sample(&export, "autoscale_items_total", &[pool_label, "status=\"failure\""]),
        Some(2.0)
    );
    assert_eq!(
        sample(&export, "autoscale_workers_spawned_total", &[pool_label]),
        Some(2.0)
    );
    assert_eq!(
        sample(&export, "autoscale_workers_disposed_total", &[pool_label]),
        Some(2.0)
    );
    assert_eq!(sample(&export, "autoscale_workers_active", &[pool_label]), Some(0.0));
    assert_eq!(sample(&export, "autoscale_queue_depth", &[pool_label]), Some(0.0));
    assert_eq!(
        sample(&export, "autoscale_item_duration_seconds_count", &[pool_label]),
        Some(8.0)
    );
}

#[tokio::test]
async fn test_metrics_file_export() {
    let metrics = Arc::new(PoolMetrics::new().unwrap());
    let pool = sleepy_pool(config("exported", 1, 1, 0)).with_metrics(Arc::clone(&metrics));

    assert_eq!(pool.submit(1).await, Ok(1));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autoscale.prom");
    metrics.write_to(&path).await.unwrap();

    let written = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(written.contains("autoscale_items_total"));
    assert!(written.contains("pool=\"exported\""));
}
