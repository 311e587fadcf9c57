//! HTTP work processor for the remote rendering API.
//!
//! Serializes each work item as JSON, POSTs it to the configured endpoint,
//! and parses the JSON answer. Non-2xx answers and bodies of the wrong shape
//! become [`ApiError`]s carrying the status and payload. Retries are left to
//! the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use render_autoscale::client::HttpProcessor;
//! use render_autoscale::pool::{AdaptiveWorkerPool, PoolConfig};
//!
//! let processor = HttpProcessor::<serde_json::Value, serde_json::Value>::from_config(&config.client)?;
//! let pool = AdaptiveWorkerPool::new(processor, PoolConfig::default())?;
//! let rendered = pool.submit(serde_json::json!({"url": "https://example.com"})).await?;
//! ```

mod endpoint;
mod error;

pub use endpoint::Endpoint;
pub use error::ApiError;

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::processor::WorkProcessor;

/// Processor that sends each input to the rendering API.
pub struct HttpProcessor<Req, Res> {
    client: reqwest::Client,
    endpoint: Endpoint,
    timeout: Duration,
    _marker: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> HttpProcessor<Req, Res>
where
    Req: Serialize,
    Res: DeserializeOwned,
{
    /// Build a processor with its own HTTP client.
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, endpoint, timeout))
    }

    /// Build a processor on a shared HTTP client.
    ///
    /// `timeout` is applied per request on top of the client's own settings.
    pub fn with_client(client: reqwest::Client, endpoint: Endpoint, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
            _marker: PhantomData,
        }
    }

    /// Build a processor from environment-derived client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let endpoint = Endpoint::new(&config.origin, &config.path, config.api_key.as_deref())?;
        Self::new(endpoint, config.timeout)
    }

    /// Get the target endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// POST one request and decode the answer.
    pub async fn post(&self, request: &Req) -> Result<Res, ApiError> {
        let response = self
            .client
            .post(self.endpoint.url().clone())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            tracing::debug!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "render request rejected"
            );
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            status: status.as_u16(),
            message: e.to_string(),
            payload: body,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl<Req, Res> WorkProcessor for HttpProcessor<Req, Res>
where
    Req: Serialize + Send + Sync + 'static,
    Res: DeserializeOwned + Send + 'static,
{
    type Input = Req;
    type Output = Res;
    type Error = ApiError;

    async fn process(&self, input: Req) -> Result<Res, ApiError> {
        self.post(&input).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
