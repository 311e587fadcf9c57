//! render_autoscale - Adaptive worker pool for calls to an autoscaling backend.
//!
//! Work arrives in bursts; the rendering service behind it scales its own
//! capacity slowly. This crate sits in between: submissions are queued and
//! served by a pool of async workers whose count grows by at most one per
//! cooldown window while there is backlog, and shrinks again when idle.
//!
//! # Features
//!
//! - **Linear ramp-up**: Immediate growth to `worker_min`, then one worker per cooldown
//! - **Idle shrink**: Workers leave after `worker_max_idle` without work
//! - **Error isolation**: A failing or panicking item never takes down its worker
//! - **HTTP processor**: JSON POST client with a path-embedded API key
//! - **Observability**: Structured JSON logging and Prometheus metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use render_autoscale::{processor_fn, AdaptiveWorkerPool, PoolConfig};
//!
//! let processor = processor_fn(|n: u64| async move { Ok::<_, String>(n * 2) });
//! let pool = AdaptiveWorkerPool::new(processor, PoolConfig::new("double"))?;
//! assert_eq!(pool.submit(21).await, Ok(42));
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty when built outside a checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)", or just "0.1.0" when built
/// outside a git checkout.
pub fn version() -> String {
    format_version(PKG_VERSION, BUILD_VERSION)
}

fn format_version(pkg: &str, build: &str) -> String {
    if build.is_empty() {
        pkg.to_string()
    } else {
        format!("{} ({})", pkg, build)
    }
}

pub mod batch;
pub mod client;
pub mod config;
pub mod logging;
pub mod observability;
pub mod pool;
pub mod processor;

// Re-exports for convenience
pub use client::{ApiError, Endpoint, HttpProcessor};
pub use config::Config;
pub use observability::PoolMetrics;
pub use pool::{AdaptiveWorkerPool, PoolConfig, PoolError, PoolStats, Submission};
pub use processor::{processor_fn, FnProcessor, WorkProcessor};
