//! Gaussian mountain ridges along authored polylines.
//!
//! Each ridge adds `peak * exp(-d² / 2σ²)` where `d` is the pixel-space
//! distance from the pixel centre to the nearest point of the polyline. The
//! sigma is the ridge width in degrees converted through the mean of the two
//! axis scales. Contributions are purely additive, so ridge order does not
//! matter.

use rayon::prelude::*;
use tracing::debug;

use crate::geography::Ridge;
use crate::projection::CoordinateFrame;
use crate::tilemap::Tilemap;

/// Window half-padding in units of the x-axis sigma.
const WINDOW_SIGMAS: f64 = 3.5;

/// A ridge's contribution over its bounding window.
struct RidgeWindow {
    x0: usize,
    y0: usize,
    width: usize,
    values: Vec<f32>,
}

/// Add one ridge to the field in place.
pub fn add_ridge(field: &mut Tilemap<f32>, frame: &CoordinateFrame, ridge: &Ridge) {
    if let Some(window) = ridge_window(frame, ridge) {
        apply_window(field, &window);
    }
}

/// Add every ridge. Windows are computed in parallel and summed in list
/// order, so repeated runs give identical bits.
pub fn add_ridges(field: &mut Tilemap<f32>, frame: &CoordinateFrame, ridges: &[Ridge]) {
    let windows: Vec<Option<RidgeWindow>> = ridges
        .par_iter()
        .map(|ridge| ridge_window(frame, ridge))
        .collect();

    for (ridge, window) in ridges.iter().zip(windows) {
        match window {
            Some(window) => {
                debug!(
                    name = %ridge.name,
                    x0 = window.x0,
                    y0 = window.y0,
                    width = window.width,
                    rows = window.values.len() / window.width,
                    "adding ridge"
                );
                apply_window(field, &window);
            }
            None => debug!(name = %ridge.name, "ridge contributes nothing inside the frame"),
        }
    }
}

fn apply_window(field: &mut Tilemap<f32>, window: &RidgeWindow) {
    for (row_idx, row) in window.values.chunks_exact(window.width).enumerate() {
        let y = window.y0 + row_idx;
        for (col, &v) in row.iter().enumerate() {
            *field.get_mut(window.x0 + col, y) += v;
        }
    }
}

fn ridge_window(frame: &CoordinateFrame, ridge: &Ridge) -> Option<RidgeWindow> {
    if ridge.points.len() < 2 {
        return None;
    }

    let pts: Vec<(f64, f64)> = ridge
        .points
        .iter()
        .map(|&[lon, lat]| frame.to_pixel_space(lon, lat))
        .collect();

    let (ppd_x, ppd_y) = frame.pixels_per_degree();
    let sigma_x = ridge.width_deg * ppd_x;
    let sigma_y = ridge.width_deg * ppd_y;
    let sigma = (sigma_x + sigma_y) / 2.0;
    // A ridge too thin for 2σ² to be representable contributes nothing.
    let two_sigma_sq = 2.0 * sigma * sigma;
    if !two_sigma_sq.is_normal() {
        return None;
    }
    let pad = sigma_x * WINDOW_SIGMAS;

    let (min_x, max_x, min_y, max_y) = pts.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(x0, x1, y0, y1), &(x, y)| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
    );

    let x_range = clamp_span(min_x - pad, max_x + pad, frame.width)?;
    let y_range = clamp_span(min_y - pad, max_y + pad, frame.height)?;

    let width = x_range.1 - x_range.0 + 1;
    let peak = ridge.peak_height;

    let mut values = Vec::with_capacity(width * (y_range.1 - y_range.0 + 1));
    for y in y_range.0..=y_range.1 {
        let py = y as f64 + 0.5;
        for x in x_range.0..=x_range.1 {
            let px = x as f64 + 0.5;
            let dist_sq = min_distance_sq(px, py, &pts);
            values.push((peak * (-dist_sq / two_sigma_sq).exp()) as f32);
        }
    }

    Some(RidgeWindow {
        x0: x_range.0,
        y0: y_range.0,
        width,
        values,
    })
}

/// Integer cell span covering `[lo, hi]`, clamped to `0..len`.
fn clamp_span(lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
    let last = (len - 1) as f64;
    let lo = lo.floor();
    let hi = hi.ceil();
    if hi < 0.0 || lo > last {
        return None;
    }
    Some((lo.max(0.0) as usize, hi.min(last) as usize))
}

/// Squared distance from `(px, py)` to the nearest segment of the polyline.
fn min_distance_sq(px: f64, py: f64, pts: &[(f64, f64)]) -> f64 {
    pts.windows(2)
        .map(|seg| segment_distance_sq(px, py, seg[0], seg[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Squared distance from a point to segment `a-b`, projection clamped to the
/// segment. A zero-length segment is a point.
fn segment_distance_sq(px: f64, py: f64, (ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let length_sq = dx * dx + dy * dy;
    let (qx, qy) = if length_sq == 0.0 {
        (ax, ay)
    } else {
        let t = (((px - ax) * dx + (py - ay) * dy) / length_sq).clamp(0.0, 1.0);
        (ax + t * dx, ay + t * dy)
    };
    (px - qx).powi(2) + (py - qy).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GeoBounds;

    fn frame() -> CoordinateFrame {
        CoordinateFrame::new(GeoBounds::default(), 240, 120).unwrap()
    }

    fn ridge(name: &str, points: Vec<[f64; 2]>, peak: f64, width: f64) -> Ridge {
        Ridge {
            name: name.into(),
            points,
            peak_height: peak,
            width_deg: width,
        }
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = (0.0, 0.0);
        let b = (10.0, 0.0);
        assert_eq!(segment_distance_sq(5.0, 3.0, a, b), 9.0);
        assert_eq!(segment_distance_sq(-3.0, 4.0, a, b), 25.0);
        assert_eq!(segment_distance_sq(13.0, 4.0, a, b), 25.0);
        assert_eq!(segment_distance_sq(1.0, 1.0, a, a), 2.0);
    }

    #[test]
    fn test_min_distance_over_polyline() {
        let pts = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        assert_eq!(min_distance_sq(12.0, 5.0, &pts), 4.0);
        assert_eq!(min_distance_sq(5.0, -1.0, &pts), 1.0);
    }

    #[test]
    fn test_peak_on_ridge_line_and_falloff() {
        let frame = frame();
        let mut field = Tilemap::new_with(240, 120, 0.0f32);
        let r = ridge("line", vec![[10.0, 40.0], [30.0, 40.0]], 50.0, 1.0);
        add_ridge(&mut field, &frame, &r);

        // Latitude 40 sits on the boundary between rows 59 and 60, half a
        // pixel from each centre; sigma is 4 pixels.
        let (x, _) = frame.lonlat_to_xy(20.0, 40.0);
        let on_ridge = *field.get(x as usize, 60);
        let expected = 50.0 * (-(0.25f64) / 32.0).exp();
        assert!((on_ridge as f64 - expected).abs() < 1e-4);

        let farther = *field.get(x as usize, 66);
        assert!(farther < on_ridge);
        // Far outside the window: untouched.
        assert_eq!(*field.get(x as usize, 110), 0.0);
        assert_eq!(*field.get(5, 60), 0.0);
    }

    #[test]
    fn test_ridges_commute() {
        let frame = frame();
        let r1 = ridge("a", vec![[0.0, 35.0], [20.0, 45.0], [25.0, 40.0]], 60.0, 0.8);
        let r2 = ridge("b", vec![[15.0, 30.0], [15.0, 50.0]], 35.0, 0.5);

        let mut forward = Tilemap::new_with(240, 120, 40.0f32);
        add_ridge(&mut forward, &frame, &r1);
        add_ridge(&mut forward, &frame, &r2);

        let mut backward = Tilemap::new_with(240, 120, 40.0f32);
        add_ridge(&mut backward, &frame, &r2);
        add_ridge(&mut backward, &frame, &r1);

        for ((_, _, &a), (_, _, &b)) in forward.iter().zip(backward.iter()) {
            assert!((a - b).abs() < 1e-4);
        }

        let mut batched = Tilemap::new_with(240, 120, 40.0f32);
        add_ridges(&mut batched, &frame, &[r1, r2]);
        assert_eq!(batched, forward);
    }

    #[test]
    fn test_vanishing_width_adds_nothing() {
        let frame = frame();
        // Runs exactly through the centres of row 60.
        let (_, lat) = frame.xy_to_lonlat(0, 60);
        let (lon0, _) = frame.xy_to_lonlat(100, 60);
        let (lon1, _) = frame.xy_to_lonlat(110, 60);
        let r = ridge("hairline", vec![[lon0, lat], [lon1, lat]], 60.0, 1e-200);

        let mut field = Tilemap::new_with(240, 120, 40.0f32);
        add_ridges(&mut field, &frame, &[r]);
        assert_eq!(field.count(|v| v.is_nan()), 0);
        assert_eq!(field.count(|&v| v != 40.0), 0);
    }

    #[test]
    fn test_ridge_off_frame_is_skipped() {
        let frame = frame();
        let mut field = Tilemap::new_with(240, 120, 0.0f32);
        let r = ridge("far", vec![[-40.0, 10.0], [-30.0, 10.0]], 80.0, 0.5);
        add_ridges(&mut field, &frame, &[r]);
        assert_eq!(field.count(|&v| v != 0.0), 0);
    }
}
