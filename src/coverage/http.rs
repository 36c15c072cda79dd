//! Remote coverage service client
//!
//! Contract: `POST {endpoint}` with body `{"address": "..."}`; a 2xx response
//! carries `{"covered": true|false}`. 429 and 5xx responses, timeouts and
//! connection failures are retried with exponential backoff.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CoverageBackend;
use crate::utils::error::CoverageError;
use crate::utils::retry::{with_retry_if, RetryConfig};

#[derive(Debug, Serialize)]
struct CoverageRequest<'a> {
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct CoverageResponse {
    covered: bool,
}

/// Coverage backend that asks a remote service
pub struct HttpCoverageBackend {
    client: Client,
    endpoint: String,
    retry: RetryConfig,
}

impl HttpCoverageBackend {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `CoverageError::Misconfigured` for an unparsable endpoint and
    /// `CoverageError::Http` if the HTTP client cannot be created
    pub fn new(
        endpoint: &str,
        user_agent: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, CoverageError> {
        url::Url::parse(endpoint)
            .map_err(|e| CoverageError::Misconfigured(format!("endpoint {endpoint}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(agent) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            retry: RetryConfig::with_delays(max_retries, 250, 4_000),
        })
    }

    fn is_retryable(error: &CoverageError) -> bool {
        match error {
            CoverageError::Status(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            CoverageError::Http(e) => e.is_timeout() || e.is_connect(),
            CoverageError::Timeout => true,
            _ => false,
        }
    }

    async fn check_once(&self, address: &str) -> Result<bool, CoverageError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CoverageRequest { address })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverageError::Status(status.as_u16()));
        }

        let body: CoverageResponse = response.json().await?;
        Ok(body.covered)
    }
}

#[async_trait]
impl CoverageBackend for HttpCoverageBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn check(&self, address: &str) -> Result<bool, CoverageError> {
        with_retry_if(&self.retry, || self.check_once(address), Self::is_retryable).await
    }
}
