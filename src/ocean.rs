//! Sea-floor depth from authored ocean basins.
//!
//! The field starts at a uniform depth and each basin, in list order, pulls
//! cells toward its own depth with Gaussian radial influence:
//! `depth = depth * (1 - w) + target * w`. The blend reads the running field,
//! so where basins overlap the later one partially overrides the earlier.
//! Basins must therefore be applied sequentially and in authored order.

use tracing::debug;

use crate::geography::OceanBasin;
use crate::projection::CoordinateFrame;
use crate::tilemap::Tilemap;

pub const BASE_OCEAN_DEPTH: f32 = 15.0;

/// Influence below this is ignored.
const MIN_INFLUENCE: f64 = 0.01;
/// Window half-size in basin radii.
const WINDOW_RADII: f64 = 2.0;

/// Depth field over water, zero on land.
pub fn ocean_depth(
    frame: &CoordinateFrame,
    basins: &[OceanBasin],
    land: &Tilemap<bool>,
) -> Tilemap<f32> {
    let mut depth = Tilemap::new_with(frame.width, frame.height, BASE_OCEAN_DEPTH);

    for basin in basins {
        apply_basin(&mut depth, frame, basin);
    }

    for (x, y, d) in depth.iter_mut() {
        if *land.get(x, y) {
            *d = 0.0;
        }
    }

    depth
}

/// Blend one basin into the running depth field.
pub fn apply_basin(depth: &mut Tilemap<f32>, frame: &CoordinateFrame, basin: &OceanBasin) {
    let (cx, cy) = frame.to_pixel_space(basin.center[0], basin.center[1]);
    // Radius measured along the longitude axis.
    let radius = basin.radius_deg * frame.pixels_per_degree().0;
    if !(radius > 0.0) {
        return;
    }

    let reach = radius * WINDOW_RADII;
    let last_x = (frame.width - 1) as f64;
    let last_y = (frame.height - 1) as f64;
    let (x0, x1) = ((cx - reach).floor(), (cx + reach).ceil());
    let (y0, y1) = ((cy - reach).floor(), (cy + reach).ceil());
    if x1 < 0.0 || y1 < 0.0 || x0 > last_x || y0 > last_y {
        debug!(name = %basin.name, "basin lies outside the frame");
        return;
    }
    let (x0, x1) = (x0.max(0.0) as usize, x1.min(last_x) as usize);
    let (y0, y1) = (y0.max(0.0) as usize, y1.min(last_y) as usize);

    let target = basin.depth;
    let mut touched = 0usize;
    for y in y0..=y1 {
        let dy = (y as f64 + 0.5 - cy) / radius;
        for x in x0..=x1 {
            let dx = (x as f64 + 0.5 - cx) / radius;
            let influence = (-(dx * dx + dy * dy) * 0.5).exp();
            if influence <= MIN_INFLUENCE {
                continue;
            }
            let cell = depth.get_mut(x, y);
            *cell = (*cell as f64 * (1.0 - influence) + target * influence) as f32;
            touched += 1;
        }
    }

    debug!(name = %basin.name, radius_px = radius, touched, "applied ocean basin");
}
