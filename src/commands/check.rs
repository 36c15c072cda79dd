use anyhow::{Context, Result};
use std::path::PathBuf;

use coverage_checker::checker::{AddressChecker, CheckOutcome};
use coverage_checker::config::{BackendKind, Config};
use coverage_checker::error::ClassifiedError;
use coverage_checker::map::Presentation;
use coverage_checker::view::{AlertKind, PageBindings};

pub struct CheckParams {
    pub address: String,
    pub backend: Option<BackendKind>,
    pub seed: Option<u64>,
    pub geojson: Option<PathBuf>,
}

pub async fn check(mut config: Config, params: CheckParams) -> Result<()> {
    if let Some(backend) = params.backend {
        config.coverage.backend = backend;
    }
    if params.seed.is_some() {
        config.coverage.simulated_seed = params.seed;
    }

    let checker = match AddressChecker::from_config(config) {
        Ok(checker) => checker,
        Err(e) => {
            tracing::error!(
                category = e.category().label(),
                recoverable = e.is_recoverable(),
                error = %e,
                "Failed to build checker"
            );
            anyhow::bail!("{}", e.user_message());
        }
    };
    println!("Checking \"{}\" ({} backend)...", params.address.trim(), checker.backend_name());

    checker.view().update(|v| v.input = params.address.clone());
    let outcome = checker.submit().await;

    let bindings = PageBindings::default();
    for patch in checker.view().snapshot().dom_patches(&bindings) {
        tracing::debug!(patch = ?patch, "Page update");
    }

    match &outcome {
        CheckOutcome::Rejected | CheckOutcome::Failed => {
            let alerts = checker.view().read(|v| v.alerts.clone());
            for alert in alerts.iter().filter(|a| a.kind == AlertKind::Error) {
                eprintln!("{}", alert.message);
            }
        }
        CheckOutcome::NotCovered => {
            println!("Sorry, this address is not yet covered.");
        }
        CheckOutcome::Covered { presentation } => {
            println!("Great news! Service is available at this address.");
            match presentation {
                Some(Presentation::Located { position, area }) => {
                    println!("  Location: {position}");
                    println!("  Coverage area: {}", area.as_deref().unwrap_or("outside drawn areas"));
                }
                Some(Presentation::Superseded) => {
                    println!("  A newer check replaced this one on the map.");
                }
                Some(Presentation::NotFound) => {
                    println!("  The address could not be placed on the map.");
                }
                None => {
                    println!("  The map is unavailable right now.");
                }
            }
        }
    }

    if let Some(path) = &params.geojson {
        match checker.map_session().await {
            Some(session) => {
                let rendered = serde_json::to_string_pretty(&session.to_geojson())
                    .context("Failed to serialize map")?;
                std::fs::write(path, rendered)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Map written to {}", path.display());
            }
            None => {
                tracing::warn!(path = %path.display(), "No map session; GeoJSON not written");
            }
        }
    }

    if matches!(outcome, CheckOutcome::Rejected | CheckOutcome::Failed) {
        anyhow::bail!("Coverage check did not complete");
    }
    Ok(())
}
