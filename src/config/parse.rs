//! Environment variable parsing utilities.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Source of configuration variables.
///
/// [`ProcessEnv`] reads the process environment; maps and arrays of pairs
/// stand in for it in tests.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<const N: usize> EnvSource for [(&str, &str); N] {
    fn var(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

/// Get environment variable with default value.
pub fn env_or(env: &dyn EnvSource, key: &str, default: &str) -> String {
    env.var(key).unwrap_or_else(|| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|s| !s.is_empty())
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(env: &dyn EnvSource, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env.var(key) {
        Some(v) if !v.is_empty() => v.parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Parse duration string (e.g., "250ms", "30s", "2m", "1h", "1d", "1w").
/// Returns None for "off" or "0".
pub fn parse_duration(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();

    if s == "off" || s == "0" || s.is_empty() {
        return Ok(None);
    }

    // Try to split into number and unit ("ms" before "s")
    let (num_str, unit) = if let Some(num) = s.strip_suffix("ms") {
        (num, "ms")
    } else if s.ends_with('s') {
        (&s[..s.len() - 1], "s")
    } else if s.ends_with('m') {
        (&s[..s.len() - 1], "m")
    } else if s.ends_with('h') {
        (&s[..s.len() - 1], "h")
    } else if s.ends_with('d') {
        (&s[..s.len() - 1], "d")
    } else if s.ends_with('w') {
        (&s[..s.len() - 1], "w")
    } else {
        // Try parsing as seconds
        return s
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| format!("invalid duration: {}", s));
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Some(Duration::from_millis(num))),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 86400 * 7,
        _ => return Err(format!("invalid unit: {}", unit)),
    };

    let duration = num
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("invalid number: {} is too large", num_str))?;

    Ok(Some(duration))
}

/// Parse environment variable as duration.
pub fn env_duration(
    env: &dyn EnvSource,
    key: &str,
    default: &str,
) -> Result<Option<Duration>, ConfigError> {
    let value = env_or(env, key, default);
    parse_duration(&value).map_err(|e| ConfigError::Parse {
        key: key.into(),
        value,
        error: e,
    })
}

/// Parse environment variable as duration where "off"/"0" mean zero.
pub fn env_duration_or(
    env: &dyn EnvSource,
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match env_opt(env, key) {
        Some(value) => parse_duration(&value)
            .map(Option::unwrap_or_default)
            .map_err(|e| ConfigError::Parse {
                key: key.into(),
                value,
                error: e,
            }),
        None => Ok(default),
    }
}
