//! Coverage decided by the configured service polygons

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::CoverageBackend;
use crate::geo::{find_containing, CoverageArea};
use crate::geocoder::Geocoder;
use crate::utils::error::CoverageError;

/// Geocodes the address and tests the point against every coverage area
///
/// An address the geocoder cannot place is reported as not covered.
pub struct PolygonBackend {
    geocoder: Arc<dyn Geocoder>,
    areas: Vec<CoverageArea>,
}

impl PolygonBackend {
    pub fn new(geocoder: Arc<dyn Geocoder>, areas: Vec<CoverageArea>) -> Self {
        Self { geocoder, areas }
    }
}

#[async_trait]
impl CoverageBackend for PolygonBackend {
    fn name(&self) -> &'static str {
        "polygon"
    }

    async fn check(&self, address: &str) -> Result<bool, CoverageError> {
        let Some(hit) = self.geocoder.locate(address).await? else {
            debug!(address = %address, "Address not found; treating as not covered");
            return Ok(false);
        };

        let area = find_containing(&self.areas, hit.position());
        debug!(
            address = %address,
            position = %hit.position(),
            area = area.map(|a| a.name.as_str()),
            "Located address"
        );
        Ok(area.is_some())
    }
}
