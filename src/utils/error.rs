//! Error types for the coverage checker
//!
//! This module defines the domain error types used throughout the workflow.

use thiserror::Error;

/// Errors that can occur while talking to the geocoding service
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body was not the expected JSON shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A coordinate string could not be parsed as a number
    #[error("Invalid coordinate '{value}' in result '{display_name}'")]
    InvalidCoordinate {
        display_name: String,
        value: String,
    },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that can occur while evaluating coverage for an address
#[derive(Error, Debug)]
pub enum CoverageError {
    /// The address was empty after trimming
    #[error("Please enter an address")]
    EmptyAddress,

    /// Backend HTTP request error
    #[error("Coverage backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Coverage backend returned status {0}")]
    Status(u16),

    /// Backend did not answer in time
    #[error("Coverage check timed out")]
    Timeout,

    /// The address had to be geocoded and that failed
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    /// Backend is not configured correctly
    #[error("Coverage backend misconfigured: {0}")]
    Misconfigured(String),
}

/// Errors raised by the map presenter
#[derive(Error, Debug)]
pub enum MapError {
    /// A mapping library resource could not be loaded
    #[error("Failed to load resource {url}: {reason}")]
    ResourceLoad { url: String, reason: String },

    /// Geocoding the confirmed address failed
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    /// The presenter was asked to draw before the session existed
    #[error("Map session is not initialized")]
    NotInitialized,
}

/// Errors raised while binding view roles to page elements
#[derive(Error, Debug)]
pub enum BindingError {
    /// An expected element id is absent from the page
    #[error("Required element '#{id}' ({role}) not found in page")]
    MissingElement { role: &'static str, id: String },

    /// An element id cannot be turned into a CSS selector
    #[error("Invalid element id '{0}'")]
    InvalidId(String),
}

impl GeocodeError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::RateLimit | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 500 | 502 | 503 | 504),
            Self::InvalidResponse(_)
            | Self::InvalidCoordinate { .. }
            | Self::InvalidUrl(_) => false,
        }
    }
}

impl CoverageError {
    /// Message shown to the user in a transient alert
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyAddress => "Please enter an address",
            _ => "Error checking address. Please try again.",
        }
    }
}
