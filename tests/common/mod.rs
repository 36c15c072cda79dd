//! Common test utilities

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use coverage_checker::checker::AddressChecker;
use coverage_checker::config::Config;
use coverage_checker::coverage::CoverageBackend;
use coverage_checker::geocoder::{AddressSuggestion, Geocoder};
use coverage_checker::map::ResourceLoader;
use coverage_checker::utils::error::{CoverageError, GeocodeError, MapError};

/// Geocoder answering from a fixed gazetteer and recording every query
#[derive(Default)]
pub struct FakeGeocoder {
    places: Vec<AddressSuggestion>,
    delays: Vec<(String, Duration)>,
    queries: Mutex<Vec<String>>,
    completed: AtomicU32,
    fail: bool,
}

#[allow(dead_code)]
impl FakeGeocoder {
    /// Kiganjo and Makongeni, both inside the default coverage areas
    pub fn thika() -> Self {
        Self::with_places(vec![
            AddressSuggestion::new("Kiganjo, Thika, Kiambu, Kenya", -1.038, 37.075),
            AddressSuggestion::new("Makongeni, Thika, Kiambu, Kenya", -1.048, 37.084),
        ])
    }

    pub fn with_places(places: Vec<AddressSuggestion>) -> Self {
        Self {
            places,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Delay answers to queries equal to `query`
    pub fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.push((query.to_string(), delay));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Searches that ran to completion
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressSuggestion>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());

        if let Some((_, delay)) = self.delays.iter().find(|(q, _)| q == query) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GeocodeError::ServerError(503));
        }

        let needle = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| {
                let name = p.display_name.to_lowercase();
                name.contains(&needle) || needle.contains(name.split(',').next().unwrap_or(""))
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Coverage backend with a canned answer
pub struct StubBackend {
    answer: Result<bool, u16>,
    delay: Duration,
    slow: Vec<(String, Duration)>,
    addresses: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubBackend {
    pub fn covered() -> Self {
        Self::new(Ok(true), Duration::ZERO)
    }

    pub fn not_covered() -> Self {
        Self::new(Ok(false), Duration::ZERO)
    }

    /// Fails with the given HTTP status
    pub fn failing(status: u16) -> Self {
        Self::new(Err(status), Duration::ZERO)
    }

    pub fn new(answer: Result<bool, u16>, delay: Duration) -> Self {
        Self {
            answer,
            delay,
            slow: Vec::new(),
            addresses: Mutex::new(Vec::new()),
        }
    }

    /// Answer for `address` only after `delay`
    pub fn slow_for(mut self, address: &str, delay: Duration) -> Self {
        self.slow.push((address.to_string(), delay));
        self
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.addresses.lock().unwrap().len()
    }
}

#[async_trait]
impl CoverageBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn check(&self, address: &str) -> Result<bool, CoverageError> {
        self.addresses.lock().unwrap().push(address.to_string());
        let delay = self
            .slow
            .iter()
            .find(|(a, _)| a == address)
            .map_or(self.delay, |(_, d)| *d);
        tokio::time::sleep(delay).await;
        self.answer.map_err(CoverageError::Status)
    }
}

/// Resource loader that only counts
#[derive(Default)]
pub struct CountingLoader {
    calls: AtomicU32,
}

#[allow(dead_code)]
impl CountingLoader {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLoader for CountingLoader {
    async fn load(&self, _url: &str) -> Result<(), MapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Checker wired to the given fakes with default configuration
#[allow(dead_code)]
pub fn checker_with(
    config: Config,
    geocoder: Arc<FakeGeocoder>,
    backend: Arc<StubBackend>,
    loader: Arc<CountingLoader>,
) -> AddressChecker {
    AddressChecker::builder(config)
        .geocoder(geocoder)
        .backend(backend)
        .resource_loader(loader)
        .build()
        .expect("checker should build from fakes")
}
