//! Prometheus metrics for the coverage workflow
//!
//! This module provides metrics tracking for:
//! - Geocoding requests by HTTP status
//! - Coverage checks by outcome
//! - Map session initializations and resource loads
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! Until then (or if registration fails) the recording functions are no-ops.

use prometheus::{
    register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder,
};
use std::sync::OnceLock;

/// Container for all workflow metrics
struct WorkflowMetrics {
    geocode_requests: CounterVec,
    coverage_checks: CounterVec,
    map_initializations: Counter,
    resource_loads: CounterVec,
    suggestions_discarded: Counter,
}

/// Global storage for workflow metrics
static METRICS: OnceLock<WorkflowMetrics> = OnceLock::new();

/// Register all metrics with the default registry
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = WorkflowMetrics {
        geocode_requests: register_counter_vec!(
            "coverage_geocode_requests_total",
            "Geocoding requests by response status",
            &["status"]
        )?,
        coverage_checks: register_counter_vec!(
            "coverage_checks_total",
            "Coverage checks by outcome",
            &["outcome"]
        )?,
        map_initializations: register_counter!(
            "coverage_map_initializations_total",
            "Map sessions created"
        )?,
        resource_loads: register_counter_vec!(
            "coverage_map_resource_loads_total",
            "Mapping library resource loads",
            &["result"]
        )?,
        suggestions_discarded: register_counter!(
            "coverage_suggestions_discarded_total",
            "Suggestion responses dropped because a newer lookup was issued"
        )?,
    };

    METRICS.set(metrics).ok();
    Ok(())
}

pub fn record_geocode_request(status: &str) {
    if let Some(m) = METRICS.get() {
        m.geocode_requests.with_label_values(&[status]).inc();
    }
}

pub fn record_coverage_check(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.coverage_checks.with_label_values(&[outcome]).inc();
    }
}

pub fn record_map_initialization() {
    if let Some(m) = METRICS.get() {
        m.map_initializations.inc();
    }
}

/// `result` is one of `fetched`, `cached` or `failed`
pub fn record_resource_load(result: &str) {
    if let Some(m) = METRICS.get() {
        m.resource_loads.with_label_values(&[result]).inc();
    }
}

pub fn record_suggestions_discarded() {
    if let Some(m) = METRICS.get() {
        m.suggestions_discarded.inc();
    }
}

/// Encode all registered metrics in the Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
