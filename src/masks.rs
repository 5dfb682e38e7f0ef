//! Binary masks derived from the geography or from finished rasters.

use tracing::debug;

use crate::geography::Geography;
use crate::projection::CoordinateFrame;
use crate::rasterize::fill_polygon;
use crate::tilemap::Tilemap;

pub const SEA_LEVEL: u8 = 32;

/// Fill every landmass, then carve every inland sea back out.
pub fn build_land_mask(frame: &CoordinateFrame, geography: &Geography) -> Tilemap<bool> {
    let mut mask = Tilemap::new_with(frame.width, frame.height, false);

    for polygon in geography.landmasses() {
        debug!(name = %polygon.name, vertices = polygon.vertices.len(), "rasterizing landmass");
        fill_polygon(&mut mask, frame, &polygon.vertices, true);
    }
    for polygon in geography.water_cutouts() {
        debug!(name = %polygon.name, "carving water body");
        fill_polygon(&mut mask, frame, &polygon.vertices, false);
    }

    mask
}

/// Union of all empire-boundary polygons.
pub fn build_empire_mask(frame: &CoordinateFrame, geography: &Geography) -> Tilemap<bool> {
    let mut mask = Tilemap::new_with(frame.width, frame.height, false);
    for polygon in geography.empire_boundaries() {
        debug!(name = %polygon.name, "rasterizing empire boundary");
        fill_polygon(&mut mask, frame, &polygon.vertices, true);
    }
    mask
}

/// Land as read back from a quantized elevation raster: anything above sea
/// level.
pub fn land_from_elevation(elevation: &Tilemap<u8>) -> Tilemap<bool> {
    elevation.map(|&h| h > SEA_LEVEL)
}
