//! Authored vector geography: the immutable input of a run.
//!
//! A geography document lists polygons (landmasses, water cut-outs, empire
//! boundaries), mountain ridges, ocean basins and province capitals, all in
//! degrees. List order is kept exactly as authored: basins and capitals are
//! order-sensitive downstream.
//!
//! The Mediterranean geography ships embedded in the binary; any document of
//! the same shape can replace it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::projection::GeoBounds;
use crate::rasterize::point_in_polygon;

const DEFAULT_GEOGRAPHY_JSON: &str = include_str!("../data/defaults/mediterranean.json");

/// A `[lon, lat]` pair in degrees.
pub type LonLat = [f64; 2];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonKind {
    /// Filled with land.
    Landmass,
    /// Carved back out of the land mask (inland seas).
    Water,
    /// Restricts which land pixels receive a province.
    Empire,
}

/// Simple polygon, implicitly closed. Self-intersecting input rasterizes to
/// whatever the even-odd rule makes of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub name: String,
    pub kind: PolygonKind,
    pub vertices: Vec<LonLat>,
}

/// A mountain ridge: an open polyline with a Gaussian cross-section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub name: String,
    pub points: Vec<LonLat>,
    /// Height added on the ridge line itself.
    pub peak_height: f64,
    /// Gaussian sigma in degrees.
    pub width_deg: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OceanBasin {
    pub name: String,
    pub center: LonLat,
    pub radius_deg: f64,
    /// Depth code the basin pulls the sea floor toward (lower is deeper).
    pub depth: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvinceCapital {
    /// Province id written to the province raster. 0 is reserved.
    pub id: u8,
    pub lon: f64,
    pub lat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl ProvinceCapital {
    pub fn display_name(&self) -> String {
        match (&self.province, &self.city) {
            (Some(p), Some(c)) => format!("{p} ({c})"),
            (Some(p), None) => p.clone(),
            (None, Some(c)) => c.clone(),
            (None, None) => format!("province {}", self.id),
        }
    }
}

/// The complete authored input of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geography {
    #[serde(default)]
    pub bounds: GeoBounds,
    pub polygons: Vec<Polygon>,
    #[serde(default)]
    pub ridges: Vec<Ridge>,
    #[serde(default)]
    pub basins: Vec<OceanBasin>,
    pub capitals: Vec<ProvinceCapital>,
}

impl Geography {
    /// The embedded Mediterranean geography.
    pub fn mediterranean() -> Self {
        Self::from_json_str(DEFAULT_GEOGRAPHY_JSON)
            .expect("embedded mediterranean.json should parse and validate")
    }

    /// Parse and validate a geography document.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let geography: Geography = serde_json::from_str(data)?;
        geography.validate()?;
        Ok(geography)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Check the preconditions the pipeline relies on. Coordinates outside
    /// the bounds are fine and are never reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capitals.is_empty() {
            return Err(ConfigError::NoCapitals);
        }

        let mut seen = HashSet::new();
        for capital in &self.capitals {
            if capital.id == 0 {
                return Err(ConfigError::ReservedProvinceId {
                    name: capital.display_name(),
                });
            }
            if !seen.insert(capital.id) {
                return Err(ConfigError::DuplicateProvinceId(capital.id));
            }
        }

        for polygon in &self.polygons {
            if polygon.vertices.len() < 3 {
                return Err(ConfigError::DegeneratePolygon {
                    name: polygon.name.clone(),
                    count: polygon.vertices.len(),
                });
            }
        }

        for ridge in &self.ridges {
            if ridge.points.len() < 2 {
                return Err(ConfigError::DegenerateRidge {
                    name: ridge.name.clone(),
                    count: ridge.points.len(),
                });
            }
            if !(ridge.width_deg > 0.0) {
                return Err(ConfigError::InvalidRidgeWidth {
                    name: ridge.name.clone(),
                    width_deg: ridge.width_deg,
                });
            }
        }

        for basin in &self.basins {
            if !(basin.radius_deg > 0.0) {
                return Err(ConfigError::InvalidBasinRadius {
                    name: basin.name.clone(),
                    radius_deg: basin.radius_deg,
                });
            }
        }

        Ok(())
    }

    pub fn polygons_of(&self, kind: PolygonKind) -> impl Iterator<Item = &Polygon> {
        self.polygons.iter().filter(move |p| p.kind == kind)
    }

    pub fn landmasses(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons_of(PolygonKind::Landmass)
    }

    pub fn water_cutouts(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons_of(PolygonKind::Water)
    }

    pub fn empire_boundaries(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons_of(PolygonKind::Empire)
    }

    pub fn capital(&self, id: u8) -> Option<&ProvinceCapital> {
        self.capitals.iter().find(|c| c.id == id)
    }

    /// Capitals that no empire polygon contains. Their provinces can still
    /// receive pixels, but usually this means a typo in the coordinates.
    pub fn capitals_outside_empire(&self) -> Vec<&ProvinceCapital> {
        self.capitals
            .iter()
            .filter(|c| {
                !self
                    .empire_boundaries()
                    .any(|p| point_in_polygon(c.lon, c.lat, &p.vertices))
            })
            .collect()
    }
}
