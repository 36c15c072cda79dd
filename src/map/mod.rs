//! Map presentation of confirmed addresses
//!
//! The [`MapPresenter`] owns the page's map session. It is created empty and
//! only builds the session (loading the mapping library resources and drawing
//! the coverage polygons) the first time a covered address has to be shown.
//!
//! ```text
//! Uninitialized --first covered address--> Initializing --resources loaded--> Ready
//!       ^                                        |
//!       +------------- resource failure ---------+
//! ```

pub mod resources;
pub mod session;

pub use resources::{HttpResourceLoader, ResourceLoader};
pub use session::{MapSession, Marker, MarkerIcon, TileLayer, Viewport};

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::MapConfig;
use crate::geo::{find_containing, LatLng};
use crate::geocoder::Geocoder;
use crate::metrics;
use crate::utils::error::MapError;
use crate::view::SharedView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Uninitialized,
    Initializing,
    Ready,
}

/// What happened when an address was presented
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// Marker placed and map revealed
    Located {
        position: LatLng,
        /// Coverage area containing the marker, if any
        area: Option<String>,
    },
    /// The geocoder had no match; the map stays hidden
    NotFound,
    /// A newer check started before the map was updated
    Superseded,
}

pub struct MapPresenter {
    config: MapConfig,
    loader: Arc<dyn ResourceLoader>,
    geocoder: Arc<dyn Geocoder>,
    state: MapState,
    session: Option<MapSession>,
}

impl MapPresenter {
    pub fn new(config: MapConfig, loader: Arc<dyn ResourceLoader>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            config,
            loader,
            geocoder,
            state: MapState::Uninitialized,
            session: None,
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn session(&self) -> Option<&MapSession> {
        self.session.as_ref()
    }

    /// Build the session unless it already exists
    async fn ensure_ready(&mut self) -> Result<(), MapError> {
        if self.state == MapState::Ready {
            return Ok(());
        }

        self.state = MapState::Initializing;
        for url in &self.config.resources {
            if let Err(e) = self.loader.load(url).await {
                self.state = MapState::Uninitialized;
                return Err(e);
            }
        }

        let mut session = MapSession::new(
            self.config.center,
            self.config.zoom,
            TileLayer {
                url_template: self.config.tile_url.clone(),
                attribution: self.config.attribution.clone(),
            },
        );
        for area in &self.config.areas {
            session.add_overlay(area.clone());
        }

        info!(
            center = %self.config.center,
            zoom = self.config.zoom,
            areas = self.config.areas.len(),
            "Map session initialized"
        );
        metrics::record_map_initialization();

        self.session = Some(session);
        self.state = MapState::Ready;
        Ok(())
    }

    /// Show `address` on the map
    ///
    /// Initializes the session on first use, then geocodes the address. A
    /// match replaces the marker, recentres the viewport and reveals the map
    /// container; no match leaves the map hidden.
    ///
    /// # Errors
    ///
    /// Resource load failures (the presenter returns to `Uninitialized`) and
    /// geocoding failures.
    pub async fn show_address(
        &mut self,
        address: &str,
        view: &SharedView,
    ) -> Result<Presentation, MapError> {
        self.ensure_ready().await?;

        let Some(hit) = self.geocoder.locate(address).await? else {
            debug!(address = %address, "No geocoding match; map stays hidden");
            return Ok(Presentation::NotFound);
        };

        let position = hit.position();
        let session = self.session.as_mut().ok_or(MapError::NotInitialized)?;
        session.place_marker(Marker::for_address(position, address));
        session.set_view(position, self.config.focus_zoom);

        let area = find_containing(&self.config.areas, position).map(|a| a.name.clone());
        view.update(|v| v.map_visible = true);

        info!(
            address = %address,
            position = %position,
            area = area.as_deref(),
            "Address shown on map"
        );
        Ok(Presentation::Located { position, area })
    }
}
