//! coverage-checker - Address coverage checker
//!
//! Debounced address suggestions from a Nominatim geocoder, coverage decisions
//! behind a replaceable backend, and a lazily built coverage map for covered
//! addresses.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`timer`] - Cancellable debounce timer
//! - [`geocoder`] - Address search (Nominatim client)
//! - [`suggest`] - Suggestion lookup for the address input
//! - [`coverage`] - Coverage evaluation and backends
//! - [`map`] - Map session and presenter state machine
//! - [`view`] - Typed view-model and page bindings
//! - [`checker`] - The workflow tying everything together
//! - [`geo`] - Coordinates and coverage polygons
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use coverage_checker::checker::{AddressChecker, CheckOutcome};
//! use coverage_checker::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let checker = AddressChecker::from_config(Config::from_env()?)?;
//!     checker.view().update(|v| v.input = "Kiganjo, Thika".to_string());
//!     if let CheckOutcome::Covered { .. } = checker.submit().await {
//!         println!("Service available");
//!     }
//!     Ok(())
//! }
//! ```

pub mod checker;
pub mod config;
pub mod coverage;
pub mod error;
pub mod geo;
pub mod geocoder;
pub mod map;
pub mod metrics;
pub mod suggest;
pub mod timer;
pub mod utils;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::checker::{AddressChecker, CheckOutcome, ClickTarget};
    pub use crate::config::Config;
    pub use crate::coverage::{CoverageBackend, CoverageEvaluator};
    pub use crate::error::{ClassifiedError, Error, ErrorCategory, Result};
    pub use crate::geo::{CoverageArea, LatLng};
    pub use crate::geocoder::{AddressSuggestion, Geocoder};
    pub use crate::map::{MapPresenter, MapState, Presentation};
    pub use crate::view::{PageBindings, SharedView, ViewState};
}

// Direct re-exports for convenience
pub use checker::{AddressChecker, CheckOutcome};
pub use geo::{CoverageArea, LatLng};
