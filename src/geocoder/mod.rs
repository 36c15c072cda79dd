//! Address search against an external geocoding service
//!
//! The [`Geocoder`] trait is the seam used by the suggestion fetcher, the map
//! presenter and the polygon coverage backend. [`NominatimClient`] is the
//! production implementation.

pub mod nominatim;

pub use nominatim::NominatimClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::utils::error::GeocodeError;

/// A candidate address returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl AddressSuggestion {
    pub fn new(display_name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            display_name: display_name.into(),
            lat,
            lon,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }
}

/// Free-text address search
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search for `query`, returning at most `limit` candidates in ranking order
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AddressSuggestion>, GeocodeError>;

    /// Best match for `address`, if any
    async fn locate(&self, address: &str) -> Result<Option<AddressSuggestion>, GeocodeError> {
        Ok(self.search(address, 1).await?.into_iter().next())
    }
}
