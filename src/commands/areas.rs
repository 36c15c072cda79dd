use anyhow::{Context, Result};

use coverage_checker::config::Config;
use coverage_checker::geo::areas_to_geojson;

/// Print the coverage areas as a GeoJSON `FeatureCollection`
pub fn areas(config: &Config) -> Result<()> {
    let collection = areas_to_geojson(&config.map.areas);
    let rendered =
        serde_json::to_string_pretty(&collection).context("Failed to serialize coverage areas")?;
    println!("{rendered}");
    Ok(())
}
