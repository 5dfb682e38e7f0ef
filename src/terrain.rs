use crate::projection::CoordinateFrame;
use crate::tilemap::Tilemap;

// Elevation codes (0-127, sea level 32).
const LAND_BASE: f32 = 38.0;
/// Flatland elevation before variation and ridges.
pub const LAND_FLOOR: f32 = LAND_BASE + 2.0;

/// Unblended land elevation: a flat floor on land, optionally with gentle
/// continental-scale undulation, zero on water. Ridges are added on top.
pub fn base_land_height(
    frame: &CoordinateFrame,
    land: &Tilemap<bool>,
    continental_variation: bool,
) -> Tilemap<f32> {
    let mut height = Tilemap::new_with(frame.width, frame.height, 0.0f32);

    for (x, y, h) in height.iter_mut() {
        if !*land.get(x, y) {
            continue;
        }
        *h = LAND_FLOOR;
        if continental_variation {
            let (lon, lat) = frame.xy_to_lonlat(x as i64, y as i64);
            *h += continental_undulation(lon, lat);
        }
    }

    height
}

/// Two long-wavelength sinusoids, peak-to-peak about ±5 codes.
fn continental_undulation(lon: f64, lat: f64) -> f32 {
    (3.0 * (lon * 0.15).sin() * (lat * 0.12).cos()
        + 2.0 * (lon * 0.08 + 1.0).sin() * (lat * 0.1 + 0.5).cos()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GeoBounds;

    #[test]
    fn test_flat_floor_on_land_only() {
        let frame = CoordinateFrame::new(GeoBounds::default(), 8, 4).unwrap();
        let mut land = Tilemap::new_with(8, 4, false);
        land.set(2, 1, true);
        let height = base_land_height(&frame, &land, false);
        assert_eq!(*height.get(2, 1), LAND_FLOOR);
        assert_eq!(height.count(|&h| h != 0.0), 1);
    }

    #[test]
    fn test_variation_stays_above_sea_level() {
        let frame = CoordinateFrame::new(GeoBounds::default(), 64, 32).unwrap();
        let land = Tilemap::new_with(64, 32, true);
        let height = base_land_height(&frame, &land, true);
        let (lo, hi) = height.min_max();
        assert!(lo >= LAND_FLOOR - 5.0 && hi <= LAND_FLOOR + 5.0);
        assert!(hi > lo);
    }
}
