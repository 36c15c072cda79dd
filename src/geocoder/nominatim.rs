//! Nominatim search client with rate limiting and retry
//!
//! This module provides the HTTP geocoder used in production, with features including:
//! - Region bias (a fixed suffix appended to every query)
//! - Rate limiting with governor (the public Nominatim policy allows 1 req/s)
//! - Automatic retry with exponential backoff on 429 and 5xx responses
//! - Parsing of the string-encoded `lat`/`lon` fields

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{AddressSuggestion, Geocoder};
use crate::config::GeocoderConfig;
use crate::metrics;
use crate::utils::error::GeocodeError;
use crate::utils::retry::{with_retry_if, RetryConfig};

/// One element of the `format=json` search response
#[derive(Debug, Deserialize)]
struct RawPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl TryFrom<RawPlace> for AddressSuggestion {
    type Error = GeocodeError;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| GeocodeError::InvalidCoordinate {
                    display_name: raw.display_name.clone(),
                    value: value.to_string(),
                })
        };

        let lat = parse(&raw.lat)?;
        let lon = parse(&raw.lon)?;

        Ok(AddressSuggestion {
            display_name: raw.display_name,
            lat,
            lon,
        })
    }
}

/// Geocoder backed by a Nominatim compatible `/search` endpoint
pub struct NominatimClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Resolved `/search` endpoint
    search_url: Url,

    /// Suffix appended to every query
    region_suffix: String,

    /// Retry policy for transient failures
    retry: RetryConfig,
}

impl NominatimClient {
    /// Create a client from geocoder configuration
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError::InvalidUrl` if the base URL cannot be parsed and
    /// `GeocodeError::Http` if the HTTP client cannot be created
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .default_headers(Self::build_headers(&config.user_agent))
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            search_url: Self::search_url(&config.base_url)?,
            region_suffix: config.region_suffix.clone(),
            retry: RetryConfig::with_delays(config.max_retries, 500, 5_000),
        })
    }

    /// Resolve `{base}/search`, keeping any path prefix of the base URL
    fn search_url(base_url: &str) -> Result<Url, GeocodeError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .and_then(|url| url.join("search"))
            .map_err(|e| GeocodeError::InvalidUrl(format!("{base_url}: {e}")))
    }

    /// Build the default request headers
    fn build_headers(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(agent) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));

        headers
    }

    /// Query text actually sent, with the region bias applied
    pub fn biased_query(&self, query: &str) -> String {
        format!("{}{}", query.trim(), self.region_suffix)
    }

    /// Single search attempt; rows with unusable coordinates are skipped
    async fn search_once(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressSuggestion>, GeocodeError> {
        self.rate_limiter.until_ready().await;

        let limit = limit.to_string();
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("format", "json"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout
                } else {
                    GeocodeError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::record_geocode_request(status.as_str());
            return Err(match status.as_u16() {
                429 => GeocodeError::RateLimit,
                code => GeocodeError::ServerError(code),
            });
        }

        let bytes = response.bytes().await?;
        let places: Vec<RawPlace> = serde_json::from_slice(&bytes)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        metrics::record_geocode_request("200");

        Ok(places
            .into_iter()
            .filter_map(|place| match AddressSuggestion::try_from(place) {
                Ok(suggestion) => Some(suggestion),
                Err(e) => {
                    warn!(error = %e, "Skipping result with invalid coordinates");
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressSuggestion>, GeocodeError> {
        let biased = self.biased_query(query);
        debug!(query = %biased, limit = limit, "Searching geocoder");

        with_retry_if(
            &self.retry,
            || self.search_once(&biased, limit),
            GeocodeError::is_transient,
        )
        .await
    }
}
