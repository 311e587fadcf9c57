//! Prometheus metrics for adaptive worker pools.
//!
//! Tracks the worker ramp (spawns, disposals, live count), the backlog, and
//! per-item outcomes. Every series carries a `pool` label so several pools
//! can share one registry.

use std::path::Path;

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

/// Outcome label for a processed work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Success,
    Failure,
    Panic,
}

impl ItemOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOutcome::Success => "success",
            ItemOutcome::Failure => "failure",
            ItemOutcome::Panic => "panic",
        }
    }
}

/// Prometheus registry with the pool metrics.
pub struct PoolMetrics {
    registry: Registry,

    /// Worker loops currently alive
    pub workers_active: GaugeVec,

    /// Items waiting to be picked up
    pub queue_depth: GaugeVec,

    /// Workers spawned since start
    pub workers_spawned_total: CounterVec,

    /// Workers disposed since start
    pub workers_disposed_total: CounterVec,

    /// Processed items by outcome
    pub items_total: CounterVec,

    /// Time spent inside the processor per item
    pub item_duration_seconds: HistogramVec,
}

impl PoolMetrics {
    /// Create a new registry with all pool metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Remote rendering calls range from tens of milliseconds to a minute
        let item_buckets = vec![
            0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ];

        let workers_active = GaugeVec::new(
            Opts::new("autoscale_workers_active", "Worker loops currently alive"),
            &["pool"],
        )?;
        registry.register(Box::new(workers_active.clone()))?;

        let queue_depth = GaugeVec::new(
            Opts::new("autoscale_queue_depth", "Work items waiting for a worker"),
            &["pool"],
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let workers_spawned_total = CounterVec::new(
            Opts::new("autoscale_workers_spawned_total", "Total workers spawned"),
            &["pool"],
        )?;
        registry.register(Box::new(workers_spawned_total.clone()))?;

        let workers_disposed_total = CounterVec::new(
            Opts::new("autoscale_workers_disposed_total", "Total workers disposed"),
            &["pool"],
        )?;
        registry.register(Box::new(workers_disposed_total.clone()))?;

        let items_total = CounterVec::new(
            Opts::new("autoscale_items_total", "Total work items processed"),
            &["pool", "status"],
        )?;
        registry.register(Box::new(items_total.clone()))?;

        let item_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "autoscale_item_duration_seconds",
                "Work item processing duration in seconds",
            )
            .buckets(item_buckets),
            &["pool"],
        )?;
        registry.register(Box::new(item_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            workers_active,
            queue_depth,
            workers_spawned_total,
            workers_disposed_total,
            items_total,
            item_duration_seconds,
        })
    }

    /// Record a worker spawn and the resulting live count.
    #[inline]
    pub fn worker_spawned(&self, pool: &str, active: usize) {
        self.workers_spawned_total.with_label_values(&[pool]).inc();
        self.workers_active
            .with_label_values(&[pool])
            .set(active as f64);
    }

    /// Record a worker disposal and the resulting live count.
    #[inline]
    pub fn worker_disposed(&self, pool: &str, active: usize) {
        self.workers_disposed_total.with_label_values(&[pool]).inc();
        self.workers_active
            .with_label_values(&[pool])
            .set(active as f64);
    }

    /// Update the backlog gauge.
    #[inline]
    pub fn set_queue_depth(&self, pool: &str, depth: usize) {
        self.queue_depth.with_label_values(&[pool]).set(depth as f64);
    }

    /// Record one processed item.
    pub fn record_item(&self, pool: &str, outcome: ItemOutcome, duration_secs: f64) {
        self.items_total
            .with_label_values(&[pool, outcome.as_str()])
            .inc();
        self.item_duration_seconds
            .with_label_values(&[pool])
            .observe(duration_secs);
    }

    /// Export all metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Write the text export to a file.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, self.export()).await
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
