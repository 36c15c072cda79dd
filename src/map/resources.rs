//! Loading of mapping library resources
//!
//! Each URL is fetched at most once per loader; later requests for the same
//! URL return immediately.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::metrics;
use crate::utils::error::MapError;
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Loads a script or stylesheet the map widget depends on
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<(), MapError>;
}

/// Fetches resources over HTTP and remembers which ones succeeded
pub struct HttpResourceLoader {
    client: Client,
    loaded: Mutex<HashSet<String>>,
    retry: RetryConfig,
}

impl HttpResourceLoader {
    pub fn new(timeout: Duration) -> Result<Self, MapError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| MapError::ResourceLoad {
                url: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            loaded: Mutex::new(HashSet::new()),
            retry: RetryConfig::with_delays(2, 250, 2_000),
        })
    }

    /// Whether `url` has been loaded successfully
    pub async fn is_loaded(&self, url: &str) -> bool {
        self.loaded.lock().await.contains(url)
    }

    async fn fetch(&self, url: &str) -> Result<usize, MapError> {
        let failure = |reason: String| MapError::ResourceLoad {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("status {status}")));
        }

        let body = response.bytes().await.map_err(|e| failure(e.to_string()))?;
        Ok(body.len())
    }
}

#[async_trait]
impl ResourceLoader for HttpResourceLoader {
    async fn load(&self, url: &str) -> Result<(), MapError> {
        // Held across the fetch so concurrent loads of one URL collapse.
        let mut loaded = self.loaded.lock().await;
        if loaded.contains(url) {
            debug!(url = %url, "Resource already loaded");
            metrics::record_resource_load("cached");
            return Ok(());
        }

        let bytes = match with_retry_if(&self.retry, || self.fetch(url), |_| true).await {
            Ok(bytes) => bytes,
            Err(e) => {
                metrics::record_resource_load("failed");
                return Err(e);
            }
        };

        info!(url = %url, bytes = bytes, "Loaded map resource");
        metrics::record_resource_load("fetched");
        loaded.insert(url.to_string());
        Ok(())
    }
}
