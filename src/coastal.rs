//! Coastal blending and the terminal land/sea quantization.
//!
//! Land ramps from [`COAST_HEIGHT`] at the shore to its full synthesized
//! height `width` pixels inland; ocean ramps from sea level at the shore to
//! its basin depth `width` pixels offshore. After optional smoothing the
//! land/sea invariant is enforced again, unconditionally, before the field
//! is truncated to 8 bits.

use rayon::prelude::*;
use tracing::debug;

use crate::distance::DistanceTransform;
use crate::error::ConfigError;
use crate::filter::Smoothing;
use crate::masks::SEA_LEVEL;
use crate::tilemap::Tilemap;

/// Land elevation right at the shoreline.
pub const COAST_HEIGHT: f32 = 34.0;
pub const DEFAULT_COASTAL_WIDTH: f32 = 6.0;
pub const MAX_ELEVATION: f32 = 127.0;

const SEA: f32 = SEA_LEVEL as f32;
const LOWEST_LAND: f32 = SEA + 1.0;

/// Distances to the shoreline, in pixels, for each side of the coast.
pub struct CoastDistances {
    /// Land cells: distance to the nearest ocean cell. Zero on ocean.
    pub land: Tilemap<f32>,
    /// Ocean cells: distance to the nearest land cell. Zero on land.
    pub ocean: Tilemap<f32>,
}

pub fn coast_distances(land: &Tilemap<bool>, transform: &dyn DistanceTransform) -> CoastDistances {
    let ocean_mask = land.map(|&is_land| !is_land);
    let (land_dist, ocean_dist) = rayon::join(
        || transform.distance_to_edge(land),
        || transform.distance_to_edge(&ocean_mask),
    );
    CoastDistances {
        land: land_dist,
        ocean: ocean_dist,
    }
}

/// Combine land heights and ocean depths into one field, ramping both
/// toward fixed reference values near the shore.
pub fn blend_coast(
    land_height: &Tilemap<f32>,
    ocean_depth: &Tilemap<f32>,
    land: &Tilemap<bool>,
    distances: &CoastDistances,
    width: f32,
) -> Result<Tilemap<f32>, ConfigError> {
    if !(width > 0.0) {
        return Err(ConfigError::InvalidParameter(format!(
            "coastal width must be positive, got {width}"
        )));
    }

    let mut blended = Tilemap::new_with(land.width, land.height, 0.0f32);
    blended.par_rows_mut().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            *out = if *land.get(x, y) {
                let f = (distances.land.get(x, y) / width).clamp(0.0, 1.0);
                land_height.get(x, y) * f + COAST_HEIGHT * (1.0 - f)
            } else {
                let f = (distances.ocean.get(x, y) / width).clamp(0.0, 1.0);
                SEA * (1.0 - f) + ocean_depth.get(x, y) * f
            };
        }
    });

    Ok(blended)
}

/// Floor land at one above sea level and cap ocean at sea level.
pub fn enforce_sea_level(field: &mut Tilemap<f32>, land: &Tilemap<bool>) {
    field.par_rows_mut().for_each(|(y, row)| {
        for (x, v) in row.iter_mut().enumerate() {
            *v = if *land.get(x, y) {
                v.max(LOWEST_LAND)
            } else {
                v.min(SEA)
            };
        }
    });
}

/// Enforce the land/sea invariant, clamp to the elevation range and truncate.
/// NaN cells resolve to the bound for their side.
pub fn quantize(field: &Tilemap<f32>, land: &Tilemap<bool>) -> Tilemap<u8> {
    let mut enforced = field.clone();
    enforce_sea_level(&mut enforced, land);
    enforced.map(|&v| v.clamp(0.0, MAX_ELEVATION) as u8)
}

/// Enforce, smooth, then enforce and quantize again.
pub fn finish_elevation(
    mut blended: Tilemap<f32>,
    land: &Tilemap<bool>,
    smoothing: Smoothing,
) -> Tilemap<u8> {
    enforce_sea_level(&mut blended, land);
    let smoothed = smoothing.apply(&blended);
    let (lo, hi) = smoothed.min_max();
    debug!(?smoothing, min = lo, max = hi, "smoothed elevation");
    quantize(&smoothed, land)
}
