//! Observability for adaptive worker pools.
//!
//! Logging goes through `tracing` (see [`crate::logging`]); this module
//! holds the Prometheus side.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use render_autoscale::observability::PoolMetrics;
//!
//! let metrics = Arc::new(PoolMetrics::new()?);
//! let pool = AdaptiveWorkerPool::new(processor, config)?.with_metrics(metrics.clone());
//! // ... submit work ...
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

pub use metrics::{ItemOutcome, PoolMetrics};
