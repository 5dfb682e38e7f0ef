use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with the authored geography or the raster frame. These abort a
/// run before any grid is allocated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse geography: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read geography from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid coordinate frame: {0}")]
    InvalidFrame(String),
    #[error("geography declares no province capitals")]
    NoCapitals,
    #[error("province capital {name:?} uses id 0, which is reserved for unassigned pixels")]
    ReservedProvinceId { name: String },
    #[error("duplicate province capital id {0}")]
    DuplicateProvinceId(u8),
    #[error("polygon {name:?} has {count} vertices; at least 3 are required")]
    DegeneratePolygon { name: String, count: usize },
    #[error("ridge {name:?} has {count} points; at least 2 are required")]
    DegenerateRidge { name: String, count: usize },
    #[error("ridge {name:?} must have a positive width, got {width_deg}")]
    InvalidRidgeWidth { name: String, width_deg: f64 },
    #[error("ocean basin {name:?} must have a positive radius, got {radius_deg}")]
    InvalidBasinRadius { name: String, radius_deg: f64 },
    #[error("invalid generation parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode raster {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize run summary: {0}")]
    Summary(#[from] serde_json::Error),
}
