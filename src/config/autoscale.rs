//! Autoscale pool configuration.

use std::time::Duration;

use super::parse::{env_duration_or, env_or, env_parse, EnvSource};
use super::ConfigError;
use crate::pool::{
    PoolConfig, DEFAULT_GROWTH_COOLDOWN, DEFAULT_SPAWN_RETRY_INTERVAL, DEFAULT_WORKER_MAX,
    DEFAULT_WORKER_MAX_IDLE, DEFAULT_WORKER_MIN, DEFAULT_WORKER_REACQUIRE_DELAY,
};

/// Ramp policy loaded from environment.
///
/// | Variable | Default |
/// |----------|---------|
/// | `AUTOSCALE_NAME` | `render` |
/// | `AUTOSCALE_WORKER_MIN` | `2` |
/// | `AUTOSCALE_WORKER_MAX` | `30` |
/// | `AUTOSCALE_GROWTH_COOLDOWN` | `3s` |
/// | `AUTOSCALE_REACQUIRE_DELAY` | `100ms` |
/// | `AUTOSCALE_MAX_IDLE` | `10s` |
/// | `AUTOSCALE_RETRY_INTERVAL` | `100ms` |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoscaleConfig {
    pub name: String,
    pub worker_min: usize,
    pub worker_max: usize,
    pub growth_cooldown: Duration,
    pub reacquire_delay: Duration,
    pub max_idle: Duration,
    pub retry_interval: Duration,
}

impl AutoscaleConfig {
    /// Load configuration from environment variables.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let worker_max = env_parse(env, "AUTOSCALE_WORKER_MAX", DEFAULT_WORKER_MAX)?;
        if worker_max == 0 {
            return Err(ConfigError::Invalid {
                key: "AUTOSCALE_WORKER_MAX".into(),
                message: "worker max cannot be zero".into(),
            });
        }

        let retry_interval = env_duration_or(
            env,
            "AUTOSCALE_RETRY_INTERVAL",
            DEFAULT_SPAWN_RETRY_INTERVAL,
        )?;
        if retry_interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: "AUTOSCALE_RETRY_INTERVAL".into(),
                message: "retry interval cannot be disabled".into(),
            });
        }

        Ok(Self {
            name: env_or(env, "AUTOSCALE_NAME", "render"),
            worker_min: env_parse(env, "AUTOSCALE_WORKER_MIN", DEFAULT_WORKER_MIN)?,
            worker_max,
            growth_cooldown: env_duration_or(
                env,
                "AUTOSCALE_GROWTH_COOLDOWN",
                DEFAULT_GROWTH_COOLDOWN,
            )?,
            reacquire_delay: env_duration_or(
                env,
                "AUTOSCALE_REACQUIRE_DELAY",
                DEFAULT_WORKER_REACQUIRE_DELAY,
            )?,
            max_idle: env_duration_or(env, "AUTOSCALE_MAX_IDLE", DEFAULT_WORKER_MAX_IDLE)?,
            retry_interval,
        })
    }

    /// Pool configuration for these settings.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.name.clone())
            .with_worker_min(self.worker_min)
            .with_worker_max(self.worker_max)
            .with_growth_cooldown(self.growth_cooldown)
            .with_worker_reacquire_delay(self.reacquire_delay)
            .with_worker_max_idle(self.max_idle)
            .with_spawn_retry_interval(self.retry_interval)
    }
}
