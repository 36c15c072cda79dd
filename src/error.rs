//! Unified error handling for the coverage-checker crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while keeping the domain errors available
//! to callers that want to match on them directly.
//!
//! # Architecture
//!
//! - [`ClassifiedError`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use coverage_checker::error::{ClassifiedError, Error};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Retrying: {}", err.user_message());
//!     } else {
//!         eprintln!("Fatal error: {}", err);
//!     }
//! }
//! ```

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{BindingError, CoverageError, GeocodeError, MapError};

/// Common trait for classified errors
pub trait ClassifiedError: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Short description suitable for an end user
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Invalid user input
    Validation,
    /// Unexpected response shapes and parse failures
    Parsing,
    /// Map session and resource errors
    Map,
    /// Configuration and page binding errors
    Config,
}

impl ErrorCategory {
    /// Human readable label for the category
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Validation => "validation error",
            Self::Parsing => "parsing error",
            Self::Map => "map error",
            Self::Config => "configuration error",
        }
    }
}

/// Unified error type for the coverage-checker crate
#[derive(Error, Debug)]
pub enum Error {
    /// Geocoding service errors
    #[error("Geocode error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Coverage evaluation errors
    #[error("Coverage error: {0}")]
    Coverage(#[from] CoverageError),

    /// Map presentation errors
    #[error("Map error: {0}")]
    Map(#[from] MapError),

    /// Page binding errors
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),
}

impl ClassifiedError for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Geocode(e) => e.is_transient(),
            Self::Coverage(CoverageError::EmptyAddress) => false,
            Self::Coverage(CoverageError::Misconfigured(_)) => false,
            Self::Coverage(CoverageError::Status(status)) => *status == 429 || *status >= 500,
            Self::Coverage(_) => true,
            Self::Map(MapError::ResourceLoad { .. }) => true,
            Self::Map(MapError::Geocode(e)) => e.is_transient(),
            Self::Map(MapError::NotInitialized) => false,
            Self::Binding(_) => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Coverage(e) => e.user_message().to_string(),
            Self::Geocode(_) => "Address lookup is unavailable right now".to_string(),
            Self::Map(_) => "The coverage map could not be shown".to_string(),
            Self::Binding(e) => format!("{}: {e}", self.category().label()),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Geocode(GeocodeError::InvalidResponse(_))
            | Self::Geocode(GeocodeError::InvalidCoordinate { .. }) => ErrorCategory::Parsing,
            Self::Geocode(_) => ErrorCategory::Network,
            Self::Coverage(CoverageError::EmptyAddress) => ErrorCategory::Validation,
            Self::Coverage(CoverageError::Misconfigured(_)) => ErrorCategory::Config,
            Self::Coverage(_) => ErrorCategory::Network,
            Self::Map(_) => ErrorCategory::Map,
            Self::Binding(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
