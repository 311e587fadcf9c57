//! Logging configuration.

use super::parse::{env_or, EnvSource};
use super::ConfigError;

/// Default filter when neither LOG_LEVEL nor RUST_LOG is set.
const DEFAULT_FILTER: &str = "render_autoscale=info";

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line (default).
    #[default]
    Json,
    /// Human-readable tracing fmt output.
    Text,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    /// Output format (LOG_FORMAT).
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: render_autoscale=debug,reqwest=warn
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let format = match env_or(env, "LOG_FORMAT", "json").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("expected json or text, got '{}'", other),
                })
            }
        };

        Ok(Self {
            filter: Self::resolve_log_filter(env),
            service_name: env_or(env, "SERVICE_NAME", "render_autoscale"),
            format,
        })
    }

    /// Resolve log filter from environment.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter(env: &dyn EnvSource) -> String {
        // 1. Check LOG_LEVEL first (simple: debug, info, warn, error)
        if let Some(level) = env.var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("render_autoscale={}", level);
                }
                _ => {
                    // Invalid level, fall through to RUST_LOG
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        // 2. Check RUST_LOG (full tracing filter syntax)
        if let Some(filter) = env.var("RUST_LOG") {
            return filter;
        }

        // 3. Default
        DEFAULT_FILTER.to_string()
    }
}
