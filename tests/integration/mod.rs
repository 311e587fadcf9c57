//! Integration tests for render_autoscale
//!
//! Pool scenarios run on tokio's paused clock, so multi-second ramps finish
//! instantly and deterministically. Client tests start an in-process hyper
//! server on an ephemeral port; nothing external is required.
//!
//! Run with: cargo test --test integration


mod client;
mod ramp;
mod reuse;
mod isolation;
mod metrics;
