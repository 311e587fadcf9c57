//! Configuration module for render_autoscale.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use render_autoscale::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Endpoint origin: {}", config.client.origin);
//! println!("Workers: {}..{}", config.autoscale.worker_min, config.autoscale.worker_max);
//! ```

mod autoscale;
mod client;
mod error;
mod logging;
mod parse;

use std::path::PathBuf;

pub use autoscale::AutoscaleConfig;
pub use client::ClientConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::{parse_duration, EnvSource, ProcessEnv};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Worker ramp configuration.
    pub autoscale: AutoscaleConfig,
    /// Rendering API configuration.
    pub client: ClientConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Where to write the Prometheus export on exit (METRICS_FILE).
    pub metrics_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            autoscale: AutoscaleConfig::from_env(env)?,
            client: ClientConfig::from_env(env)?,
            logging: LoggingConfig::from_env(env)?,
            metrics_file: parse::env_opt(env, "METRICS_FILE").map(PathBuf::from),
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Pool: {}", self.autoscale.name);
        info!(
            "  Workers: {}..{}",
            self.autoscale.worker_min, self.autoscale.worker_max
        );
        info!(
            "  Growth cooldown: {}ms",
            self.autoscale.growth_cooldown.as_millis()
        );
        info!(
            "  Idle timeout: {}ms (reacquire every {}ms)",
            self.autoscale.max_idle.as_millis(),
            self.autoscale.reacquire_delay.as_millis()
        );
        info!("  Origin: {}", self.client.origin);
        info!("  Path: {}", self.client.path);
        info!("  Request timeout: {}s", self.client.timeout.as_secs());

        if self.client.api_key.is_some() {
            info!("  API key: set");
        } else {
            info!("  API key: none");
        }

        if let Some(ref path) = self.metrics_file {
            info!("  Metrics file: {}", path.display());
        }
    }
}
