//! Request URL composition.

use std::fmt;

use reqwest::Url;

use super::ApiError;

/// Placeholder shown instead of the API key in logs.
const REDACTED: &str = "***";

/// Fully composed rendering endpoint: `{origin}/{api_key}{path}`.
///
/// The key is embedded as a path segment and percent-encoded like any other
/// segment. Without a key the URL is just `{origin}{path}`.
#[derive(Clone, Debug)]
pub struct Endpoint {
    url: Url,
    redacted: String,
}

impl Endpoint {
    pub fn new(origin: &str, path: &str, api_key: Option<&str>) -> Result<Self, ApiError> {
        let origin = Url::parse(origin)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", origin, e)))?;

        let url = compose(&origin, api_key, path)?;
        let redacted = compose(&origin, api_key.map(|_| REDACTED), path)?.to_string();

        Ok(Self { url, redacted })
    }

    /// URL requests are sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL with the API key masked, for logging.
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

fn compose(origin: &Url, api_key: Option<&str>, path: &str) -> Result<Url, ApiError> {
    let mut url = origin.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            ApiError::InvalidEndpoint(format!("{} cannot carry a path", origin))
        })?;
        segments.pop_if_empty();
        if let Some(key) = api_key {
            segments.push(key);
        }
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}
