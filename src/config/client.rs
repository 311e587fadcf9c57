//! Rendering API client configuration.

use std::time::Duration;

use super::parse::{env_duration, env_opt, env_or, EnvSource};
use super::ConfigError;

/// Connection settings for the rendering API loaded from environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host, and optional base path (RENDER_API_ORIGIN, required).
    pub origin: String,
    /// Endpoint path appended after the key (RENDER_API_PATH).
    pub path: String,
    /// Key embedded in the request path (RENDER_API_KEY).
    pub api_key: Option<String>,
    /// Per-request timeout (RENDER_TIMEOUT).
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let origin = env_opt(env, "RENDER_API_ORIGIN").ok_or_else(|| ConfigError::Missing {
            key: "RENDER_API_ORIGIN".into(),
        })?;

        if let Err(e) = reqwest::Url::parse(&origin) {
            return Err(ConfigError::Parse {
                key: "RENDER_API_ORIGIN".into(),
                value: origin,
                error: e.to_string(),
            });
        }

        let timeout = env_duration(env, "RENDER_TIMEOUT", "30s")?.ok_or_else(|| {
            ConfigError::Invalid {
                key: "RENDER_TIMEOUT".into(),
                message: "timeout cannot be disabled".into(),
            }
        })?;

        Ok(Self {
            origin,
            path: env_or(env, "RENDER_API_PATH", "/"),
            api_key: env_opt(env, "RENDER_API_KEY"),
            timeout,
        })
    }
}
