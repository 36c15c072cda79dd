//! The address coverage workflow
//!
//! [`AddressChecker`] wires the pieces together and exposes the events a page
//! produces: typing, clicking, picking a suggestion and submitting the form.
//!
//! - Typing restarts the debounce timer; when it fires the suggestion panel
//!   is refreshed.
//! - Submitting (or picking a suggestion) runs a coverage check and, for a
//!   covered address, shows it on the map.
//!
//! Every failure is caught here and turned into a log line or an alert.
//! Checks may overlap; map updates are applied one at a time and only for the
//! most recent check.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::config::{BackendKind, Config};
use crate::coverage::{
    CoverageBackend, CoverageEvaluator, HttpCoverageBackend, PolygonBackend, SimulatedBackend,
};
use crate::error::Result;
use crate::geocoder::{AddressSuggestion, Geocoder, NominatimClient};
use crate::map::{HttpResourceLoader, MapPresenter, MapSession, Presentation, ResourceLoader};
use crate::metrics;
use crate::suggest::SuggestionFetcher;
use crate::timer::Debouncer;
use crate::utils::error::CoverageError;
use crate::utils::normalize_whitespace;
use crate::view::{AlertKind, SharedView};

/// Where a click landed, relative to the address widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Input,
    SuggestionPanel,
    Elsewhere,
}

/// Result of one coverage check cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Empty address; an alert was raised and nothing was requested
    Rejected,
    /// Covered; `presentation` is `None` when the map could not be shown
    Covered { presentation: Option<Presentation> },
    NotCovered,
    /// The backend failed; an alert was raised
    Failed,
}

struct Inner {
    view: SharedView,
    debouncer: Debouncer,
    suggestions: SuggestionFetcher,
    evaluator: CoverageEvaluator,
    map: Mutex<MapPresenter>,
    lookup_generation: AtomicU64,
    check_generation: AtomicU64,
    alert_ttl: Duration,
}

/// Handle to the workflow; clones share the same state
#[derive(Clone)]
pub struct AddressChecker {
    inner: Arc<Inner>,
}

impl AddressChecker {
    pub fn builder(config: Config) -> CheckerBuilder {
        CheckerBuilder::new(config)
    }

    /// Build the production workflow described by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        CheckerBuilder::new(config).build()
    }

    pub fn view(&self) -> &SharedView {
        &self.inner.view
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.evaluator.backend_name()
    }

    /// The input changed
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_input(&self, text: &str) {
        self.inner.view.update(|v| v.input = text.to_string());

        let this = self.clone();
        self.inner.debouncer.schedule(async move {
            this.refresh_suggestions().await;
        });
    }

    /// Fetch suggestions for the current input right away
    ///
    /// A response that arrives after a newer lookup started is discarded.
    pub async fn refresh_suggestions(&self) {
        let query = self.inner.view.read(|v| v.input.clone());
        let generation = self.inner.lookup_generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.inner.suggestions.fetch(&query).await {
            Ok(outcome) => {
                if self.inner.lookup_generation.load(Ordering::SeqCst) != generation {
                    debug!(query = %query, "Discarding superseded suggestions");
                    metrics::record_suggestions_discarded();
                    return;
                }
                let panel = outcome.into_panel();
                self.inner.view.update(|v| v.suggestions = panel);
            }
            Err(e) => {
                error!(query = %query, error = %e, "Error fetching suggestions");
            }
        }
    }

    /// A click anywhere on the page
    pub fn on_click(&self, target: ClickTarget) {
        if target == ClickTarget::Elsewhere {
            self.inner.view.update(|v| v.suggestions.visible = false);
        }
    }

    /// Pick the suggestion at `index` and check it
    ///
    /// Returns `None` if there is no such suggestion.
    pub async fn select_suggestion(&self, index: usize) -> Option<CheckOutcome> {
        let selected: AddressSuggestion = self.inner.view.update(|v| {
            let selected = v.suggestions.items().get(index).cloned()?;
            v.input = selected.display_name.clone();
            v.suggestions.visible = false;
            Some(selected)
        })?;

        debug!(address = %selected.display_name, "Suggestion selected");
        Some(self.check_address(&selected.display_name).await)
    }

    /// The address form was submitted
    pub async fn submit(&self) -> CheckOutcome {
        let address = self.inner.view.read(|v| v.input.clone());
        self.check_address(&address).await
    }

    /// Run one coverage check cycle for `address`
    ///
    /// An empty address is rejected right away. Otherwise the loading state is
    /// held for the evaluation only; the map update that follows a covered
    /// result waits for earlier map updates and is skipped if a newer check
    /// started in the meantime.
    pub async fn check_address(&self, address: &str) -> CheckOutcome {
        let view = &self.inner.view;
        let address = normalize_whitespace(address);
        if address.is_empty() {
            view.raise_alert(
                AlertKind::Error,
                CoverageError::EmptyAddress.user_message(),
                self.inner.alert_ttl,
            );
            return CheckOutcome::Rejected;
        }

        let generation = self.inner.check_generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.inner.evaluator.evaluate(&address, view).await {
            Ok(true) => CheckOutcome::Covered {
                presentation: self.present(&address, generation).await,
            },
            Ok(false) => CheckOutcome::NotCovered,
            Err(e) => {
                error!(address = %address, error = %e, "Error checking address");
                view.raise_alert(AlertKind::Error, e.user_message(), self.inner.alert_ttl);
                CheckOutcome::Failed
            }
        }
    }

    async fn present(&self, address: &str, generation: u64) -> Option<Presentation> {
        let mut map = self.inner.map.lock().await;
        if self.inner.check_generation.load(Ordering::SeqCst) != generation {
            debug!(address = %address, "Newer check started; map left to it");
            return Some(Presentation::Superseded);
        }

        match map.show_address(address, &self.inner.view).await {
            Ok(presentation) => Some(presentation),
            Err(e) => {
                error!(address = %address, error = %e, "Geocoding error");
                None
            }
        }
    }

    /// Copy of the map session, if it has been created
    pub async fn map_session(&self) -> Option<MapSession> {
        self.inner.map.lock().await.session().cloned()
    }
}

/// Assembles an [`AddressChecker`], with overridable collaborators
pub struct CheckerBuilder {
    config: Config,
    geocoder: Option<Arc<dyn Geocoder>>,
    backend: Option<Arc<dyn CoverageBackend>>,
    loader: Option<Arc<dyn ResourceLoader>>,
    view: Option<SharedView>,
}

impl CheckerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            geocoder: None,
            backend: None,
            loader: None,
            view: None,
        }
    }

    /// Use `geocoder` for suggestions, map placement and the polygon backend
    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Use `backend` instead of the configured one
    pub fn backend(mut self, backend: Arc<dyn CoverageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn view(mut self, view: SharedView) -> Self {
        self.view = Some(view);
        self
    }

    fn configured_backend(
        config: &Config,
        geocoder: &Arc<dyn Geocoder>,
    ) -> Result<Arc<dyn CoverageBackend>> {
        let backend: Arc<dyn CoverageBackend> = match config.coverage.backend {
            BackendKind::Simulated => {
                if config.coverage.simulated_seed.is_none() {
                    warn!("Using the simulated coverage backend; results are random");
                }
                Arc::new(SimulatedBackend::from_config(&config.coverage))
            }
            BackendKind::Polygon => Arc::new(PolygonBackend::new(
                Arc::clone(geocoder),
                config.map.areas.clone(),
            )),
            BackendKind::Http => {
                let endpoint = config.coverage.endpoint.as_deref().ok_or_else(|| {
                    CoverageError::Misconfigured("coverage.endpoint is not set".to_string())
                })?;
                Arc::new(HttpCoverageBackend::new(
                    endpoint,
                    &config.geocoder.user_agent,
                    config.coverage_timeout(),
                    config.coverage.max_retries,
                )?)
            }
        };
        Ok(backend)
    }

    pub fn build(self) -> Result<AddressChecker> {
        let config = self.config;

        let geocoder: Arc<dyn Geocoder> = match self.geocoder {
            Some(geocoder) => geocoder,
            None => Arc::new(NominatimClient::new(&config.geocoder)?),
        };

        let backend = match self.backend {
            Some(backend) => backend,
            None => Self::configured_backend(&config, &geocoder)?,
        };

        let loader: Arc<dyn ResourceLoader> = match self.loader {
            Some(loader) => loader,
            None => Arc::new(HttpResourceLoader::new(config.request_timeout())?),
        };

        let inner = Inner {
            view: self.view.unwrap_or_default(),
            debouncer: Debouncer::new(config.debounce_delay()),
            suggestions: SuggestionFetcher::new(
                Arc::clone(&geocoder),
                config.geocoder.min_query_chars,
                config.geocoder.suggestion_limit,
            ),
            evaluator: CoverageEvaluator::new(backend, config.coverage_timeout()),
            map: Mutex::new(MapPresenter::new(config.map.clone(), loader, geocoder)),
            lookup_generation: AtomicU64::new(0),
            check_generation: AtomicU64::new(0),
            alert_ttl: config.alert_ttl(),
        };

        Ok(AddressChecker {
            inner: Arc::new(inner),
        })
    }
}
