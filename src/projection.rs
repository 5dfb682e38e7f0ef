//! Linear lon/lat <-> pixel mapping for the atlas frame.
//!
//! The frame is a plain equirectangular window: longitude grows to the east
//! along x, latitude grows to the north against y (row 0 is the northern
//! edge). Nothing here rejects or clamps input; authored geography routinely
//! runs past the map edge and the rasterizer clamps where it writes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longitude/latitude window covered by the rasters, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Default for GeoBounds {
    /// The Mediterranean window: lon [-10, 50], lat [25, 55].
    fn default() -> Self {
        Self {
            lon_min: -10.0,
            lon_max: 50.0,
            lat_min: 25.0,
            lat_max: 55.0,
        }
    }
}

impl GeoBounds {
    pub fn lon_range(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn lat_range(&self) -> f64 {
        self.lat_max - self.lat_min
    }
}

/// Bounds plus pixel dimensions. Shared by every grid in a run so that pixel
/// (x, y) names the same place in the elevation and province rasters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CoordinateFrame {
    pub bounds: GeoBounds,
    pub width: usize,
    pub height: usize,
}

impl CoordinateFrame {
    pub fn new(bounds: GeoBounds, width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidFrame(format!(
                "raster dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let finite = [bounds.lon_min, bounds.lon_max, bounds.lat_min, bounds.lat_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || bounds.lon_range() <= 0.0 || bounds.lat_range() <= 0.0 {
            return Err(ConfigError::InvalidFrame(format!(
                "bounds must be finite with min < max, got lon [{}, {}] lat [{}, {}]",
                bounds.lon_min, bounds.lon_max, bounds.lat_min, bounds.lat_max
            )));
        }
        Ok(Self {
            bounds,
            width,
            height,
        })
    }

    /// Continuous pixel-space x of a longitude (0.0 = western edge).
    pub fn lon_to_px(&self, lon: f64) -> f64 {
        (lon - self.bounds.lon_min) / self.bounds.lon_range() * self.width as f64
    }

    /// Continuous pixel-space y of a latitude (0.0 = northern edge).
    pub fn lat_to_py(&self, lat: f64) -> f64 {
        (self.bounds.lat_max - lat) / self.bounds.lat_range() * self.height as f64
    }

    /// Continuous pixel-space position of a (lon, lat) pair.
    pub fn to_pixel_space(&self, lon: f64, lat: f64) -> (f64, f64) {
        (self.lon_to_px(lon), self.lat_to_py(lat))
    }

    /// Column containing `lon`. May be negative or >= width.
    pub fn lon_to_x(&self, lon: f64) -> i64 {
        self.lon_to_px(lon).floor() as i64
    }

    /// Row containing `lat`. May be negative or >= height.
    pub fn lat_to_y(&self, lat: f64) -> i64 {
        self.lat_to_py(lat).floor() as i64
    }

    pub fn lonlat_to_xy(&self, lon: f64, lat: f64) -> (i64, i64) {
        (self.lon_to_x(lon), self.lat_to_y(lat))
    }

    /// Longitude of the centre of column `x`.
    pub fn x_to_lon(&self, x: i64) -> f64 {
        self.bounds.lon_min + (x as f64 + 0.5) / self.width as f64 * self.bounds.lon_range()
    }

    /// Latitude of the centre of row `y`.
    pub fn y_to_lat(&self, y: i64) -> f64 {
        self.bounds.lat_max - (y as f64 + 0.5) / self.height as f64 * self.bounds.lat_range()
    }

    pub fn xy_to_lonlat(&self, x: i64, y: i64) -> (f64, f64) {
        (self.x_to_lon(x), self.y_to_lat(y))
    }

    /// Pixels per degree along each axis.
    pub fn pixels_per_degree(&self) -> (f64, f64) {
        (
            self.width as f64 / self.bounds.lon_range(),
            self.height as f64 / self.bounds.lat_range(),
        )
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize) -> CoordinateFrame {
        CoordinateFrame::new(GeoBounds::default(), width, height).unwrap()
    }

    #[test]
    fn test_round_trip_every_pixel() {
        for (w, h) in [(256, 256), (300, 173), (2048, 2048)] {
            let f = frame(w, h);
            for x in 0..w as i64 {
                let lon = f.x_to_lon(x);
                assert_eq!(f.lon_to_x(lon), x, "column {x} of {w}");
            }
            for y in 0..h as i64 {
                let lat = f.y_to_lat(y);
                assert_eq!(f.lat_to_y(lat), y, "row {y} of {h}");
            }
        }
    }

    #[test]
    fn test_north_is_row_zero() {
        let f = frame(256, 256);
        assert_eq!(f.lat_to_y(54.99), 0);
        assert_eq!(f.lat_to_y(25.01), 255);
        assert_eq!(f.lon_to_x(-9.99), 0);
        assert_eq!(f.lon_to_x(49.99), 255);
    }

    #[test]
    fn test_out_of_frame_is_not_rejected() {
        let f = frame(256, 256);
        assert!(f.lon_to_x(-20.0) < 0);
        assert!(f.lat_to_y(60.0) < 0);
        assert!(f.lon_to_x(55.0) >= 256);
        // Just west of the edge floors to -1, not 0.
        assert_eq!(f.lon_to_x(-10.01), -1);
    }

    #[test]
    fn test_invalid_frames_are_config_errors() {
        assert!(CoordinateFrame::new(GeoBounds::default(), 0, 10).is_err());
        let flipped = GeoBounds {
            lon_min: 50.0,
            lon_max: -10.0,
            ..GeoBounds::default()
        };
        assert!(CoordinateFrame::new(flipped, 10, 10).is_err());
    }

    #[test]
    fn test_pixels_per_degree() {
        let f = frame(2048, 2048);
        let (sx, sy) = f.pixels_per_degree();
        assert!((sx - 2048.0 / 60.0).abs() < 1e-9);
        assert!((sy - 2048.0 / 30.0).abs() < 1e-9);
    }
}
