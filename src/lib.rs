//! Atlas generation library
//!
//! Turns authored vector geography into co-registered elevation and
//! province rasters. Re-exports modules for use by the binary and tools.

pub mod coastal;
pub mod distance;
pub mod error;
pub mod export;
pub mod filter;
pub mod geography;
pub mod masks;
pub mod ocean;
pub mod pipeline;
pub mod projection;
pub mod provinces;
pub mod rasterize;
pub mod ridges;
pub mod terrain;
pub mod tilemap;

pub use error::{AtlasError, ConfigError};
pub use geography::Geography;
pub use pipeline::{generate_atlas, Atlas, GenerationParams};
