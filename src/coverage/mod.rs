//! Coverage evaluation
//!
//! The [`CoverageEvaluator`] validates the address, holds the loading state
//! for the duration of the check and shows exactly one outcome panel. The
//! decision itself comes from a [`CoverageBackend`]:
//!
//! - [`SimulatedBackend`] - random outcome after a fixed delay
//! - [`PolygonBackend`] - geocode and test against the coverage polygons
//! - [`HttpCoverageBackend`] - remote coverage service

pub mod http;
pub mod polygon;
pub mod simulated;

pub use http::HttpCoverageBackend;
pub use polygon::PolygonBackend;
pub use simulated::SimulatedBackend;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::metrics;
use crate::utils::error::CoverageError;
use crate::utils::normalize_whitespace;
use crate::view::{LoadingGuard, SharedView};

/// Source of coverage decisions
#[async_trait]
pub trait CoverageBackend: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Whether service is available at `address`
    async fn check(&self, address: &str) -> Result<bool, CoverageError>;
}

/// Runs coverage checks against a backend and reflects them in the view
#[derive(Clone)]
pub struct CoverageEvaluator {
    backend: Arc<dyn CoverageBackend>,
    timeout: Duration,
}

impl CoverageEvaluator {
    pub fn new(backend: Arc<dyn CoverageBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Check `address` and show the matching outcome panel
    ///
    /// The loading state is entered only for non-empty addresses and is
    /// released on every exit path. On success the lead form, not-covered
    /// message and map container are hidden before exactly one of the first
    /// two is shown; on failure the previous panels stay as they were.
    ///
    /// # Errors
    ///
    /// `CoverageError::EmptyAddress` without touching the backend, otherwise
    /// any backend failure or `CoverageError::Timeout`.
    pub async fn evaluate(&self, address: &str, view: &SharedView) -> Result<bool, CoverageError> {
        let address = normalize_whitespace(address);
        if address.is_empty() {
            return Err(CoverageError::EmptyAddress);
        }

        let _loading = LoadingGuard::acquire(view);
        info!(address = %address, backend = self.backend.name(), "Checking coverage");

        let covered = match tokio::time::timeout(self.timeout, self.backend.check(&address)).await
        {
            Ok(Ok(covered)) => covered,
            Ok(Err(e)) => {
                warn!(address = %address, error = %e, "Coverage check failed");
                metrics::record_coverage_check("error");
                return Err(e);
            }
            Err(_) => {
                warn!(address = %address, timeout_ms = self.timeout.as_millis(), "Coverage check timed out");
                metrics::record_coverage_check("timeout");
                return Err(CoverageError::Timeout);
            }
        };

        view.update(|v| {
            v.clear_results();
            if covered {
                v.lead_form_visible = true;
            } else {
                v.not_covered_visible = true;
            }
        });

        metrics::record_coverage_check(if covered { "covered" } else { "not_covered" });
        info!(address = %address, covered = covered, "Coverage check complete");
        Ok(covered)
    }
}
