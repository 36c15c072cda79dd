//! Geographic primitives: coordinates and coverage polygons
//!
//! Coverage areas are simple (non self-intersecting) polygons given as an
//! ordered ring of vertices. The ring is implicitly closed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components lie inside the valid WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// GeoJSON position (`[lon, lat]` order)
    pub fn to_position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Stroke and fill used when a coverage area is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStyle {
    pub color: String,
    pub fill_opacity: f64,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            fill_opacity: 0.2,
        }
    }
}

/// A named, serviceable zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageArea {
    pub name: String,
    pub vertices: Vec<LatLng>,
    #[serde(default)]
    pub style: PolygonStyle,
}

impl CoverageArea {
    pub fn new(name: impl Into<String>, vertices: Vec<LatLng>) -> Self {
        Self {
            name: name.into(),
            vertices,
            style: PolygonStyle::default(),
        }
    }

    /// Point-in-polygon test (even-odd rule)
    ///
    /// Longitude is the x axis and latitude the y axis. Points exactly on an
    /// edge may land on either side.
    pub fn contains(&self, point: LatLng) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (yi, xi) = (self.vertices[i].lat, self.vertices[i].lon);
            let (yj, xj) = (self.vertices[j].lat, self.vertices[j].lon);

            if (yi > point.lat) != (yj > point.lat)
                && point.lon < (xj - xi) * (point.lat - yi) / (yj - yi) + xi
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// GeoJSON `Feature` with a closed polygon ring
    pub fn to_geojson(&self) -> Value {
        let mut ring: Vec<[f64; 2]> = self.vertices.iter().map(LatLng::to_position).collect();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }

        json!({
            "type": "Feature",
            "properties": {
                "name": self.name,
                "stroke": self.style.color,
                "fill": self.style.color,
                "fill-opacity": self.style.fill_opacity,
            },
            "geometry": {
                "type": "Polygon",
                "coordinates": [ring],
            }
        })
    }
}

/// First area that contains `point`, in declaration order
pub fn find_containing(areas: &[CoverageArea], point: LatLng) -> Option<&CoverageArea> {
    areas.iter().find(|area| area.contains(point))
}

/// The serviceable zones around Thika
pub fn default_coverage_areas() -> Vec<CoverageArea> {
    vec![
        CoverageArea::new(
            "Kiganjo",
            vec![
                LatLng::new(-1.033, 37.070),
                LatLng::new(-1.033, 37.080),
                LatLng::new(-1.043, 37.080),
                LatLng::new(-1.043, 37.070),
            ],
        ),
        CoverageArea::new(
            "Makongeni",
            vec![
                LatLng::new(-1.040, 37.075),
                LatLng::new(-1.040, 37.085),
                LatLng::new(-1.050, 37.085),
                LatLng::new(-1.050, 37.075),
            ],
        ),
        CoverageArea::new(
            "Kisii Estate",
            vec![
                LatLng::new(-1.036, 37.082),
                LatLng::new(-1.036, 37.092),
                LatLng::new(-1.046, 37.092),
                LatLng::new(-1.046, 37.082),
            ],
        ),
    ]
}

/// GeoJSON `FeatureCollection` of the given areas
pub fn areas_to_geojson(areas: &[CoverageArea]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": areas.iter().map(CoverageArea::to_geojson).collect::<Vec<_>>(),
    })
}
