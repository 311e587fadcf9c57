//! Adaptive worker pool implementation.
//!
//! Workers are tokio tasks draining a shared FIFO queue. The pool grows by
//! at most one worker per growth cooldown while there is backlog (filling up
//! to the floor immediately), and workers leave once they have been idle for
//! long enough.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::config::PoolConfig;
use super::error::PoolResult;
use super::submission::{ItemResult, Submission};
use super::PoolStats;
use crate::observability::{ItemOutcome, PoolMetrics};
use crate::processor::WorkProcessor;

/// Shortest period accepted by the retry timer.
const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Lower bound for the idle re-check period.
const MIN_REACQUIRE_DELAY: Duration = Duration::from_millis(1);

/// Caller input paired with its not-yet-fulfilled result slot.
struct WorkItem<P: WorkProcessor> {
    input: P::Input,
    result_tx: oneshot::Sender<ItemResult<P::Output, P::Error>>,
}

/// Mutable pool state. Every field is read and written under one lock.
struct PoolState<P: WorkProcessor> {
    pending: VecDeque<WorkItem<P>>,
    active_workers: usize,
    /// `None` until the first spawn, so the cooldown never blocks it.
    last_spawn: Option<Instant>,
    /// Live only while work is pending; never more than one.
    retry_timer: Option<JoinHandle<()>>,
    next_worker_id: u64,
    submitted: u64,
    succeeded: u64,
    failed: u64,
    panicked: u64,
    workers_spawned: u64,
    workers_disposed: u64,
}

impl<P: WorkProcessor> PoolState<P> {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            active_workers: 0,
            last_spawn: None,
            retry_timer: None,
            next_worker_id: 0,
            submitted: 0,
            succeeded: 0,
            failed: 0,
            panicked: 0,
            workers_spawned: 0,
            workers_disposed: 0,
        }
    }
}

struct Shared<P: WorkProcessor> {
    processor: P,
    config: PoolConfig,
    runtime: Handle,
    metrics: OnceLock<Arc<PoolMetrics>>,
    state: Mutex<PoolState<P>>,
}

/// What a worker does after inspecting the queue.
enum Step<P: WorkProcessor> {
    Process(WorkItem<P>),
    Wait,
    Dispose { remaining: usize },
}

/// Concurrency controller that ramps workers up under backlog and back
/// down when idle.
///
/// Cloning is cheap and every clone drives the same pool. Queued and
/// in-flight work keeps running after the last handle is dropped.
pub struct AdaptiveWorkerPool<P: WorkProcessor> {
    shared: Arc<Shared<P>>,
}

impl<P: WorkProcessor> Clone for AdaptiveWorkerPool<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: WorkProcessor> std::fmt::Debug for AdaptiveWorkerPool<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveWorkerPool")
            .field("name", &self.name())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<P: WorkProcessor> AdaptiveWorkerPool<P> {
    /// Create a pool on the current tokio runtime.
    pub fn new(processor: P, config: PoolConfig) -> PoolResult<Self> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_handle(processor, config, runtime))
    }

    /// Create a pool whose workers and timer run on `runtime`.
    pub fn with_handle(processor: P, config: PoolConfig, runtime: Handle) -> Self {
        if config.is_inverted() {
            warn!(
                pool = %config.name,
                worker_min = config.worker_min,
                worker_max = config.worker_max,
                "worker_max is below worker_min, ramp behavior is undefined"
            );
        }

        info!(
            pool = %config.name,
            processor = processor.name(),
            worker_min = config.worker_min,
            worker_max = config.worker_max,
            growth_cooldown_ms = config.growth_cooldown.as_millis() as u64,
            max_idle_ms = config.worker_max_idle.as_millis() as u64,
            "adaptive worker pool created"
        );

        Self {
            shared: Arc::new(Shared {
                processor,
                config,
                runtime,
                metrics: OnceLock::new(),
                state: Mutex::new(PoolState::new()),
            }),
        }
    }

    /// Attach a metrics registry. Only the first call has an effect.
    pub fn with_metrics(self, metrics: Arc<PoolMetrics>) -> Self {
        let _ = self.shared.metrics.set(metrics);
        self
    }

    /// Enqueue `input` and return a future for its result.
    ///
    /// Never suspends. Results arrive in completion order; submission order
    /// only decides which waiting item is picked up next.
    pub fn submit(&self, input: P::Input) -> Submission<P::Output, P::Error> {
        let (result_tx, result_rx) = oneshot::channel();

        {
            let mut state = self.shared.lock();
            state.pending.push_back(WorkItem { input, result_tx });
            state.submitted += 1;
            self.shared.observe_queue_depth(state.pending.len());
        }

        self.shared.try_spawn_worker();
        Submission::new(result_rx)
    }

    /// Number of worker loops currently alive.
    pub fn active_workers(&self) -> usize {
        self.shared.lock().active_workers
    }

    /// Number of items waiting for a worker.
    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Returns true while the spawn retry timer is running.
    pub fn is_retry_timer_active(&self) -> bool {
        self.shared.lock().retry_timer.is_some()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock();
        PoolStats {
            active_workers: state.active_workers,
            pending: state.pending.len(),
            submitted: state.submitted,
            succeeded: state.succeeded,
            failed: state.failed,
            panicked: state.panicked,
            workers_spawned: state.workers_spawned,
            workers_disposed: state.workers_disposed,
        }
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    /// Get the processor driven by this pool.
    pub fn processor(&self) -> &P {
        &self.shared.processor
    }
}

impl<P: WorkProcessor> Shared<P> {
    fn lock(&self) -> MutexGuard<'_, PoolState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn metrics(&self) -> Option<&PoolMetrics> {
        self.metrics.get().map(|m| m.as_ref())
    }

    fn observe_queue_depth(&self, depth: usize) {
        if let Some(metrics) = self.metrics() {
            metrics.set_queue_depth(&self.config.name, depth);
        }
    }

    /// Add a worker if the ramp policy allows it, and make sure the retry
    /// timer runs while work is pending.
    fn try_spawn_worker(self: &Arc<Self>) {
        let mut state = self.lock();
        if state.active_workers >= self.config.worker_max || state.pending.is_empty() {
            return;
        }

        let now = Instant::now();
        let below_floor = state.active_workers < self.config.worker_min;
        let cooldown_elapsed = state
            .last_spawn
            .map_or(true, |last| {
                last.checked_add(self.config.growth_cooldown)
                    .map_or(false, |ready| now >= ready)
            });

        if below_floor || cooldown_elapsed {
            state.active_workers += 1;
            state.last_spawn = Some(now);
            state.workers_spawned += 1;
            let worker_id = state.next_worker_id;
            state.next_worker_id += 1;

            debug!(
                pool = %self.config.name,
                worker = worker_id,
                active = state.active_workers,
                below_floor,
                "worker spawned"
            );
            if let Some(metrics) = self.metrics() {
                metrics.worker_spawned(&self.config.name, state.active_workers);
            }

            // Starts on a later scheduler tick, never inline
            self.runtime.spawn(Arc::clone(self).run_worker(worker_id));
        }

        if state.retry_timer.is_none() {
            debug!(pool = %self.config.name, "spawn retry timer started");
            state.retry_timer = Some(self.runtime.spawn(Arc::clone(self).run_retry_timer()));
        }
    }

    /// Re-run the spawn decision periodically until the queue drains, so
    /// deferred growth happens even without new submissions.
    async fn run_retry_timer(self: Arc<Self>) {
        let period = self.config.spawn_retry_interval.max(MIN_RETRY_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            {
                let mut state = self.lock();
                if state.pending.is_empty() {
                    state.retry_timer = None;
                    break;
                }
            }
            self.try_spawn_worker();
        }

        debug!(pool = %self.config.name, "spawn retry timer stopped");
    }

    /// Worker state machine: PROCESSING and IDLE_WAITING until disposed.
    async fn run_worker(self: Arc<Self>, worker_id: u64) {
        let reacquire_delay = self.config.worker_reacquire_delay.max(MIN_REACQUIRE_DELAY);
        let mut idle_since = Instant::now();

        loop {
            let idle = idle_since.elapsed();
            let step = self.next_step(idle);

            match step {
                Step::Process(item) => {
                    self.process_item(item).await;
                    idle_since = Instant::now();
                    self.try_spawn_worker();
                    tokio::task::yield_now().await;
                }
                Step::Wait => {
                    tokio::time::sleep(reacquire_delay).await;
                }
                Step::Dispose { remaining } => {
                    debug!(
                        pool = %self.config.name,
                        worker = worker_id,
                        idle_ms = idle.as_millis() as u64,
                        active = remaining,
                        "worker disposed"
                    );
                    if let Some(metrics) = self.metrics() {
                        metrics.worker_disposed(&self.config.name, remaining);
                    }
                    return;
                }
            }
        }
    }

    /// Dequeue the head item, or decide between waiting and leaving.
    ///
    /// A worker at or below the floor leaves as soon as the queue is empty,
    /// since the next submission refills the floor without cooldown.
    fn next_step(&self, idle: Duration) -> Step<P> {
        let mut state = self.lock();

        if let Some(item) = state.pending.pop_front() {
            self.observe_queue_depth(state.pending.len());
            return Step::Process(item);
        }

        if idle > self.config.worker_max_idle || state.active_workers <= self.config.worker_min {
            state.active_workers = state.active_workers.saturating_sub(1);
            state.workers_disposed += 1;
            return Step::Dispose {
                remaining: state.active_workers,
            };
        }

        Step::Wait
    }

    /// Run the processor for one item and fulfill its result slot.
    async fn process_item(&self, item: WorkItem<P>) {
        let WorkItem { input, result_tx } = item;
        let started = Instant::now();

        let result = AssertUnwindSafe(self.processor.process(input))
            .catch_unwind()
            .await;

        let outcome = match &result {
            Ok(Ok(_)) => ItemOutcome::Success,
            Ok(Err(_)) => ItemOutcome::Failure,
            Err(_) => ItemOutcome::Panic,
        };

        {
            let mut state = self.lock();
            match outcome {
                ItemOutcome::Success => state.succeeded += 1,
                ItemOutcome::Failure => state.failed += 1,
                ItemOutcome::Panic => state.panicked += 1,
            }
        }

        if let Some(metrics) = self.metrics() {
            metrics.record_item(
                &self.config.name,
                outcome,
                started.elapsed().as_secs_f64(),
            );
        }

        // The caller may have dropped its submission
        let _ = result_tx.send(result);
    }
}
