//! Adaptive worker pool.
//!
//! Decouples work arriving at an unpredictable rate from the number of
//! concurrent calls made to a [`WorkProcessor`](crate::processor::WorkProcessor).
//! Concurrency ramps up linearly while there is backlog, so a remote service
//! that autoscales its own capacity is never hit with a cold burst, and
//! ramps back down when idle.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   AdaptiveWorkerPool                       │
//! ├────────────────────────────────────────────────────────────┤
//! │              ┌───────────────┐                             │
//! │              │   submit()    │  (never suspends)           │
//! │              └───────┬───────┘                             │
//! │                      │ push_back         try_spawn_worker  │
//! │              ┌───────▼───────┐      ┌──────────────────┐   │
//! │              │ pending queue │◀─────│ retry timer      │   │
//! │              │   (FIFO)      │      │ (while backlog)  │   │
//! │              └───────┬───────┘      └──────────────────┘   │
//! │                      │ pop_front                           │
//! │       ┌──────────────┼──────────────┐                      │
//! │  ┌────▼────┐    ┌────▼────┐    ┌────▼────┐                 │
//! │  │ Worker1 │    │ Worker2 │    │ WorkerN │  min ≤ N ≤ max  │
//! │  └─────────┘    └─────────┘    └─────────┘                 │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Ramp policy
//!
//! - Below `worker_min`, every spawn attempt adds a worker immediately.
//! - At or above it, at most one worker is added per `growth_cooldown`.
//! - Never more than `worker_max` workers.
//! - An idle worker leaves once its idle time exceeds `worker_max_idle`, or
//!   right away when the pool is at or below the floor.

mod adaptive;
mod config;
mod error;
mod submission;

pub use adaptive::AdaptiveWorkerPool;
pub use config::{
    PoolConfig, DEFAULT_GROWTH_COOLDOWN, DEFAULT_SPAWN_RETRY_INTERVAL, DEFAULT_WORKER_MAX,
    DEFAULT_WORKER_MAX_IDLE, DEFAULT_WORKER_MIN, DEFAULT_WORKER_REACQUIRE_DELAY,
};
pub use error::{PoolError, PoolResult};
pub use submission::Submission;

/// Snapshot of pool counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Worker loops currently alive.
    pub active_workers: usize,
    /// Items waiting for a worker.
    pub pending: usize,
    /// Items submitted since creation.
    pub submitted: u64,
    /// Items whose processor call succeeded.
    pub succeeded: u64,
    /// Items whose processor call returned an error.
    pub failed: u64,
    /// Items whose processor call panicked.
    pub panicked: u64,
    /// Workers spawned since creation.
    pub workers_spawned: u64,
    /// Workers disposed since creation.
    pub workers_disposed: u64,
}

impl PoolStats {
    /// Items that have finished, whatever the outcome.
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed + self.panicked
    }

    /// Items submitted but not yet finished (queued or in flight).
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.completed())
    }
}
