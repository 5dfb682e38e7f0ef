//! Stage orchestration: geography in, elevation and province rasters out.

use serde::Serialize;
use tracing::{info, warn};

use crate::coastal::{blend_coast, coast_distances, finish_elevation, DEFAULT_COASTAL_WIDTH};
use crate::distance::{DistanceMode, DistanceStrategy, DistanceTransform};
use crate::error::ConfigError;
use crate::filter::Smoothing;
use crate::geography::{Geography, ProvinceCapital};
use crate::masks::{build_empire_mask, build_land_mask, land_from_elevation, SEA_LEVEL};
use crate::ocean::ocean_depth;
use crate::projection::CoordinateFrame;
use crate::provinces::{partition_provinces, province_stats, ProvinceStats, NO_PROVINCE};
use crate::ridges::add_ridges;
use crate::terrain::base_land_height;
use crate::tilemap::Tilemap;

pub const DEFAULT_SIZE: usize = 2048;

/// Tunables of one run. The geography itself is passed separately.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GenerationParams {
    /// Shoreline ramp width in pixels.
    pub coastal_width: f32,
    pub smoothing: Smoothing,
    pub continental_variation: bool,
    pub distance: DistanceMode,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            coastal_width: DEFAULT_COASTAL_WIDTH,
            smoothing: Smoothing::default(),
            continental_variation: true,
            distance: DistanceMode::Auto,
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.coastal_width > 0.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "coastal width must be positive, got {}",
                self.coastal_width
            )));
        }
        if let Smoothing::Gaussian { sigma } = self.smoothing {
            if !(sigma > 0.0) || !sigma.is_finite() {
                return Err(ConfigError::InvalidParameter(format!(
                    "smoothing sigma must be positive and finite, got {sigma}"
                )));
            }
        }
        Ok(())
    }
}

/// Summary figures of a finished elevation raster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElevationStats {
    pub min: u8,
    pub max: u8,
    pub land_pixels: usize,
    pub ocean_pixels: usize,
    pub mean_land: f64,
    pub mean_ocean: f64,
}

impl ElevationStats {
    pub fn measure(elevation: &Tilemap<u8>) -> Self {
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        let (mut land_pixels, mut land_sum) = (0usize, 0u64);
        let (mut ocean_pixels, mut ocean_sum) = (0usize, 0u64);

        for &v in elevation.as_slice() {
            min = min.min(v);
            max = max.max(v);
            if v > SEA_LEVEL {
                land_pixels += 1;
                land_sum += v as u64;
            } else {
                ocean_pixels += 1;
                ocean_sum += v as u64;
            }
        }

        let mean = |sum: u64, n: usize| if n == 0 { 0.0 } else { sum as f64 / n as f64 };
        Self {
            min,
            max,
            land_pixels,
            ocean_pixels,
            mean_land: mean(land_sum, land_pixels),
            mean_ocean: mean(ocean_sum, ocean_pixels),
        }
    }
}

/// Quantized elevation for the whole frame.
pub fn generate_elevation(
    frame: &CoordinateFrame,
    geography: &Geography,
    params: &GenerationParams,
    transform: &dyn DistanceTransform,
) -> Result<Tilemap<u8>, ConfigError> {
    params.validate()?;

    let land = build_land_mask(frame, geography);
    let land_count = land.count(|&l| l);
    let total = frame.pixel_count();
    info!(
        land = land_count,
        ocean = total - land_count,
        land_pct = 100.0 * land_count as f64 / total as f64,
        "land mask"
    );

    let depth = ocean_depth(frame, &geography.basins, &land);
    info!(basins = geography.basins.len(), "ocean depth");

    let mut height = base_land_height(frame, &land, params.continental_variation);
    add_ridges(&mut height, frame, &geography.ridges);
    let (lo, hi) = height.min_max();
    info!(ridges = geography.ridges.len(), min = lo, max = hi, "land height");

    info!(strategy = transform.name(), "computing coast distances");
    let distances = coast_distances(&land, transform);
    let blended = blend_coast(&height, &depth, &land, &distances, params.coastal_width)?;
    let elevation = finish_elevation(blended, &land, params.smoothing);

    let stats = ElevationStats::measure(&elevation);
    info!(
        min = stats.min,
        max = stats.max,
        mean_land = stats.mean_land,
        mean_ocean = stats.mean_ocean,
        "elevation"
    );

    Ok(elevation)
}

/// Province ids for the land of a finished elevation raster. Land is read
/// back from the elevation threshold so both rasters agree pixel for pixel.
pub fn generate_province_map(
    frame: &CoordinateFrame,
    geography: &Geography,
    elevation: &Tilemap<u8>,
) -> Result<Tilemap<u8>, ConfigError> {
    for capital in geography.capitals_outside_empire() {
        warn!(
            id = capital.id,
            name = %capital.display_name(),
            lon = capital.lon,
            lat = capital.lat,
            "province capital lies outside every empire boundary"
        );
    }

    let land = land_from_elevation(elevation);
    let empire = build_empire_mask(frame, geography);
    let assignable = land.zip_map(&empire, |&l, &e| l && e);

    let provinces = partition_provinces(frame, &geography.capitals, &assignable)?;
    let assigned = provinces.count(|&id| id != NO_PROVINCE);
    info!(
        capitals = geography.capitals.len(),
        assignable = assignable.count(|&a| a),
        assigned,
        "province map"
    );

    Ok(provinces)
}

/// Capitals whose province won no pixels, in authored order.
pub fn unclaimed_capitals<'a>(
    geography: &'a Geography,
    stats: &[ProvinceStats],
) -> Vec<&'a ProvinceCapital> {
    stats
        .iter()
        .filter(|s| s.pixels == 0)
        .filter_map(|s| geography.capital(s.id))
        .collect()
}

/// Everything one run produces.
pub struct Atlas {
    pub frame: CoordinateFrame,
    pub params: GenerationParams,
    /// Name of the distance transform actually used.
    pub distance: &'static str,
    pub elevation: Tilemap<u8>,
    pub provinces: Tilemap<u8>,
    pub elevation_stats: ElevationStats,
    pub province_stats: Vec<ProvinceStats>,
}

pub fn generate_atlas(
    geography: &Geography,
    width: usize,
    height: usize,
    params: &GenerationParams,
) -> Result<Atlas, ConfigError> {
    geography.validate()?;
    params.validate()?;
    let frame = CoordinateFrame::new(geography.bounds, width, height)?;
    let strategy = DistanceStrategy::select(params.distance);

    info!(
        width,
        height,
        polygons = geography.polygons.len(),
        ridges = geography.ridges.len(),
        basins = geography.basins.len(),
        capitals = geography.capitals.len(),
        "generating atlas"
    );

    let elevation = generate_elevation(&frame, geography, params, &strategy)?;
    let provinces = generate_province_map(&frame, geography, &elevation)?;

    let province_stats = province_stats(&provinces, &geography.capitals);
    for capital in unclaimed_capitals(geography, &province_stats) {
        warn!(
            id = capital.id,
            name = %capital.display_name(),
            lon = capital.lon,
            lat = capital.lat,
            "province received no pixels"
        );
    }

    Ok(Atlas {
        frame,
        params: *params,
        distance: strategy.name(),
        elevation_stats: ElevationStats::measure(&elevation),
        elevation,
        provinces,
        province_stats,
    })
}
