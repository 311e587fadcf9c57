//! Adaptive pool configuration.

use std::time::Duration;

/// Default floor of concurrently active workers.
pub const DEFAULT_WORKER_MIN: usize = 2;

/// Default ceiling of concurrently active workers.
pub const DEFAULT_WORKER_MAX: usize = 30;

/// Default minimum time between worker-count increases above the floor.
pub const DEFAULT_GROWTH_COOLDOWN: Duration = Duration::from_millis(3000);

/// Default delay an idle worker waits before checking the queue again.
pub const DEFAULT_WORKER_REACQUIRE_DELAY: Duration = Duration::from_millis(100);

/// Default cumulative idle time after which a worker terminates.
pub const DEFAULT_WORKER_MAX_IDLE: Duration = Duration::from_millis(10_000);

/// Default period of the timer that retries deferred spawns.
pub const DEFAULT_SPAWN_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Ramp policy for an [`AdaptiveWorkerPool`](super::AdaptiveWorkerPool).
///
/// No validation is performed. A `worker_max` below `worker_min` is accepted
/// and leaves the ramp behavior undefined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Pool name for logging and metric labels.
    pub name: String,
    /// Below this many workers a new one is spawned immediately on demand.
    pub worker_min: usize,
    /// Hard ceiling on concurrent workers.
    pub worker_max: usize,
    /// Minimum time between successive increases once at or above the floor.
    pub growth_cooldown: Duration,
    /// How long a worker that found no work waits before looking again.
    pub worker_reacquire_delay: Duration,
    /// Cumulative idle time after which a worker terminates.
    pub worker_max_idle: Duration,
    /// Period of the retry timer that keeps growth going without new submissions.
    pub spawn_retry_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "autoscale".to_string(),
            worker_min: DEFAULT_WORKER_MIN,
            worker_max: DEFAULT_WORKER_MAX,
            growth_cooldown: DEFAULT_GROWTH_COOLDOWN,
            worker_reacquire_delay: DEFAULT_WORKER_REACQUIRE_DELAY,
            worker_max_idle: DEFAULT_WORKER_MAX_IDLE,
            spawn_retry_interval: DEFAULT_SPAWN_RETRY_INTERVAL,
        }
    }
}

impl PoolConfig {
    /// Create a config with defaults and the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the worker floor.
    pub fn with_worker_min(mut self, worker_min: usize) -> Self {
        self.worker_min = worker_min;
        self
    }

    /// Set the worker ceiling.
    pub fn with_worker_max(mut self, worker_max: usize) -> Self {
        self.worker_max = worker_max;
        self
    }

    /// Set the growth cooldown.
    pub fn with_growth_cooldown(mut self, cooldown: Duration) -> Self {
        self.growth_cooldown = cooldown;
        self
    }

    /// Set the idle reacquire delay.
    pub fn with_worker_reacquire_delay(mut self, delay: Duration) -> Self {
        self.worker_reacquire_delay = delay;
        self
    }

    /// Set the idle timeout.
    pub fn with_worker_max_idle(mut self, max_idle: Duration) -> Self {
        self.worker_max_idle = max_idle;
        self
    }

    /// Set the spawn retry timer period.
    pub fn with_spawn_retry_interval(mut self, interval: Duration) -> Self {
        self.spawn_retry_interval = interval;
        self
    }

    /// Returns true if the floor exceeds the ceiling.
    pub fn is_inverted(&self) -> bool {
        self.worker_max < self.worker_min
    }
}
