//! Configuration management for the coverage checker
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every section has defaults matching the public
//! Thika deployment, so an empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::geo::{default_coverage_areas, CoverageArea, LatLng};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geocoding service configuration
    pub geocoder: GeocoderConfig,

    /// Coverage backend configuration
    pub coverage: CoverageConfig,

    /// Map presentation configuration
    pub map: MapConfig,

    /// Interaction timing
    pub ui: UiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Geocoding (Nominatim search) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of the search service
    pub base_url: String,

    /// Text appended to every query to bias results to the service region
    pub region_suffix: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum retry attempts for 429/5xx responses
    pub max_retries: u32,

    /// Number of candidates requested for the suggestion list
    pub suggestion_limit: usize,

    /// Minimum trimmed query length before suggestions are fetched
    pub min_query_chars: usize,
}

/// Which coverage backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Random outcome after a fixed delay
    Simulated,
    /// Geocode and test against the configured coverage polygons
    Polygon,
    /// Ask a remote coverage service
    Http,
}

/// Coverage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Backend used for coverage decisions
    pub backend: BackendKind,

    /// Delay before the simulated backend answers, in milliseconds
    pub simulated_delay_ms: u64,

    /// Probability that the simulated backend reports coverage
    pub simulated_probability: f64,

    /// Fixed RNG seed for the simulated backend
    pub simulated_seed: Option<u64>,

    /// Endpoint of the HTTP coverage service
    pub endpoint: Option<String>,

    /// Overall timeout of a single coverage check, in seconds
    pub timeout_secs: u64,

    /// Maximum retry attempts of the HTTP backend
    pub max_retries: u32,
}

/// Map presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial viewport center
    pub center: LatLng,

    /// Initial zoom level
    pub zoom: u8,

    /// Zoom level used when focusing a located address
    pub focus_zoom: u8,

    /// Tile URL template
    pub tile_url: String,

    /// Tile attribution (HTML)
    pub attribution: String,

    /// Mapping library resources loaded once per session
    pub resources: Vec<String>,

    /// Static coverage areas drawn on the map
    pub areas: Vec<CoverageArea>,
}

/// Interaction timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Quiet period before suggestions are fetched, in milliseconds
    pub debounce_ms: u64,

    /// Lifetime of transient alerts, in seconds
    pub alert_ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://nominatim.openstreetmap.org"),
            region_suffix: String::from(", Thika, Kenya"),
            user_agent: format!("coverage-checker/{}", env!("CARGO_PKG_VERSION")),
            requests_per_second: 1,
            request_timeout_secs: 10,
            max_retries: 2,
            suggestion_limit: 5,
            min_query_chars: 3,
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Simulated,
            simulated_delay_ms: 1500,
            simulated_probability: 0.7,
            simulated_seed: None,
            endpoint: None,
            timeout_secs: 10,
            max_retries: 2,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(-1.039, 37.08),
            zoom: 14,
            focus_zoom: 16,
            tile_url: String::from("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"),
            attribution: String::from(
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>",
            ),
            resources: vec![
                String::from("https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"),
                String::from("https://unpkg.com/leaflet-pip@1.1.0/leaflet-pip.js"),
            ],
            areas: default_coverage_areas(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            alert_ttl_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `COVERAGE_*` environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("COVERAGE_GEOCODER_URL") {
            self.geocoder.base_url = url;
        }
        if let Ok(suffix) = std::env::var("COVERAGE_REGION_SUFFIX") {
            self.geocoder.region_suffix = suffix;
        }
        if let Ok(agent) = std::env::var("COVERAGE_USER_AGENT") {
            self.geocoder.user_agent = agent;
        }
        if let Some(rps) = env_parse("COVERAGE_RATE_LIMIT") {
            self.geocoder.requests_per_second = rps;
        }
        if let Some(secs) = env_parse("COVERAGE_REQUEST_TIMEOUT") {
            self.geocoder.request_timeout_secs = secs;
        }

        if let Ok(backend) = std::env::var("COVERAGE_BACKEND") {
            self.coverage.backend = match backend.to_lowercase().as_str() {
                "simulated" => BackendKind::Simulated,
                "polygon" => BackendKind::Polygon,
                "http" => BackendKind::Http,
                other => anyhow::bail!("Unknown COVERAGE_BACKEND '{other}'"),
            };
        }
        if let Ok(endpoint) = std::env::var("COVERAGE_ENDPOINT") {
            self.coverage.endpoint = Some(endpoint);
        }
        if let Some(seed) = env_parse("COVERAGE_SEED") {
            self.coverage.simulated_seed = Some(seed);
        }

        if let Some(ms) = env_parse("COVERAGE_DEBOUNCE_MS") {
            self.ui.debounce_ms = ms;
        }

        if let Ok(level) = std::env::var("COVERAGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COVERAGE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.geocoder.base_url).with_context(|| {
            format!("geocoder.base_url is not a valid URL: {}", self.geocoder.base_url)
        })?;

        if self.geocoder.requests_per_second == 0 {
            anyhow::bail!("geocoder.requests_per_second must be greater than 0");
        }

        if self.geocoder.suggestion_limit == 0 {
            anyhow::bail!("geocoder.suggestion_limit must be greater than 0");
        }

        if self.ui.debounce_ms == 0 {
            anyhow::bail!("ui.debounce_ms must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.coverage.simulated_probability) {
            anyhow::bail!("coverage.simulated_probability must be within 0.0..=1.0");
        }

        if self.coverage.timeout_secs == 0 {
            anyhow::bail!("coverage.timeout_secs must be greater than 0");
        }

        if self.coverage.backend == BackendKind::Http && self.coverage.endpoint.is_none() {
            anyhow::bail!("coverage.endpoint is required for the http backend");
        }

        if !self.map.center.is_valid() {
            anyhow::bail!("map.center is not a valid coordinate");
        }

        for area in &self.map.areas {
            if area.vertices.len() < 3 {
                anyhow::bail!("coverage area '{}' needs at least 3 vertices", area.name);
            }
            if let Some(bad) = area.vertices.iter().find(|v| !v.is_valid()) {
                anyhow::bail!("coverage area '{}' has invalid vertex {bad}", area.name);
            }
        }

        Ok(())
    }

    /// Get geocoder request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder.request_timeout_secs)
    }

    /// Get debounce quiet period as Duration
    #[must_use]
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.ui.debounce_ms)
    }

    /// Get coverage check timeout as Duration
    #[must_use]
    pub fn coverage_timeout(&self) -> Duration {
        Duration::from_secs(self.coverage.timeout_secs)
    }

    /// Get alert lifetime as Duration
    #[must_use]
    pub fn alert_ttl(&self) -> Duration {
        Duration::from_secs(self.ui.alert_ttl_secs)
    }
}
