//! In-memory model of the embedded map
//!
//! A [`MapSession`] mirrors what the page's map widget shows: the viewport,
//! the tile layer, the coverage overlays and at most one location marker.

use serde::Serialize;
use serde_json::{json, Value};

use crate::geo::{CoverageArea, LatLng};

const MARKER_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor" class="w-6 h-6 text-green-600"><path fill-rule="evenodd" d="M11.54 22.351l.07.04.028.016a.76.76 0 00.723 0l.028-.015.071-.041a16.975 16.975 0 001.144-.742 19.58 19.58 0 002.683-2.282c1.944-1.99 3.963-4.98 3.963-8.827a8.25 8.25 0 00-16.5 0c0 3.846 2.02 6.837 3.963 8.827a19.58 19.58 0 002.682 2.282 16.975 16.975 0 001.145.742zM12 13.5a3 3 0 100-6 3 3 0 000 6z" clip-rule="evenodd" /></svg>"#;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

/// HTML icon drawn for the location marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub class_name: String,
    pub html: String,
    /// Width and height in pixels
    pub size: (u32, u32),
    /// Pixel offset of the tip from the top-left corner
    pub anchor: (u32, u32),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            class_name: "location-marker".to_string(),
            html: MARKER_SVG.to_string(),
            size: (32, 32),
            anchor: (16, 32),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub icon: MarkerIcon,
    pub popup_html: String,
}

impl Marker {
    /// Location marker labelled with the (escaped) address
    pub fn for_address(position: LatLng, address: &str) -> Self {
        Self {
            position,
            icon: MarkerIcon::default(),
            popup_html: format!(
                "<b>Your Location</b><br>{}",
                html_escape::encode_text(address)
            ),
        }
    }
}

/// Map widget state for one page session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSession {
    viewport: Viewport,
    tile_layer: TileLayer,
    overlays: Vec<CoverageArea>,
    marker: Option<Marker>,
}

impl MapSession {
    pub fn new(center: LatLng, zoom: u8, tile_layer: TileLayer) -> Self {
        Self {
            viewport: Viewport { center, zoom },
            tile_layer,
            overlays: Vec::new(),
            marker: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tile_layer(&self) -> &TileLayer {
        &self.tile_layer
    }

    pub fn overlays(&self) -> &[CoverageArea] {
        &self.overlays
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn add_overlay(&mut self, area: CoverageArea) {
        self.overlays.push(area);
    }

    /// Place `marker`, returning the one it replaces
    pub fn place_marker(&mut self, marker: Marker) -> Option<Marker> {
        self.marker.replace(marker)
    }

    pub fn remove_marker(&mut self) -> Option<Marker> {
        self.marker.take()
    }

    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport { center, zoom };
    }

    /// GeoJSON `FeatureCollection` of the overlays and the marker
    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self.overlays.iter().map(CoverageArea::to_geojson).collect();

        if let Some(marker) = &self.marker {
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "kind": "location",
                    "popup": marker.popup_html,
                    "icon": marker.icon.class_name,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": marker.position.to_position(),
                }
            }));
        }

        json!({
            "type": "FeatureCollection",
            "features": features,
            "viewport": {
                "center": self.viewport.center.to_position(),
                "zoom": self.viewport.zoom,
            },
        })
    }
}
