//! Scanline polygon fill.
//!
//! Each raster row is sampled along its centre line. Edge crossings use the
//! half-open test (`yi <= y < yj` or `yj <= y < yi`) so a vertex that sits
//! exactly on the scanline is counted once. Crossings are sorted and filled
//! pairwise (even-odd rule); a pixel is covered when its centre lies in a
//! span, both span ends inclusive.
//!
//! Filling overwrites. Land is built by filling landmasses with 1 and then
//! filling each inland sea with 0.

use rayon::prelude::*;

use crate::geography::LonLat;
use crate::projection::CoordinateFrame;
use crate::tilemap::Tilemap;

/// Fill `vertices` (lon/lat, implicitly closed) into `grid` with `value`.
///
/// Works for any cell type, so the same routine writes binary masks and
/// exact scalar values. Parts of the polygon outside the frame are clipped.
pub fn fill_polygon<T>(grid: &mut Tilemap<T>, frame: &CoordinateFrame, vertices: &[LonLat], value: T)
where
    T: Clone + Send + Sync,
{
    if vertices.len() < 3 || grid.width == 0 || grid.height == 0 {
        return;
    }

    let pts: Vec<(f64, f64)> = vertices
        .iter()
        .map(|&[lon, lat]| frame.to_pixel_space(lon, lat))
        .collect();

    let (min_y, max_y) = pts
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));

    // Rows whose centre (y + 0.5) can meet the polygon, clamped to the grid.
    let last_row = (grid.height - 1) as f64;
    let y_lo = (min_y - 0.5).ceil().clamp(0.0, last_row) as usize;
    let y_hi = (max_y - 0.5).floor();
    if y_hi < 0.0 {
        return;
    }
    let y_hi = y_hi.min(last_row) as usize;
    if y_lo > y_hi {
        return;
    }

    let last_col = (grid.width - 1) as f64;
    let value = &value;
    let pts = &pts;

    grid.par_rows_mut()
        .skip(y_lo)
        .take(y_hi - y_lo + 1)
        .for_each(|(y, row)| {
            let crossings = scanline_crossings(pts, y as f64 + 0.5);
            for pair in crossings.chunks_exact(2) {
                let start = (pair[0] - 0.5).ceil();
                let end = (pair[1] - 0.5).floor();
                if end < 0.0 || start > last_col || start > end {
                    continue;
                }
                let start = start.max(0.0) as usize;
                let end = end.min(last_col) as usize;
                row[start..=end].fill(value.clone());
            }
        });
}

/// Sorted x positions where the horizontal line at `sy` crosses the
/// polygon's edges.
fn scanline_crossings(pts: &[(f64, f64)], sy: f64) -> Vec<f64> {
    let mut crossings = Vec::new();
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi <= sy && sy < yj) || (yj <= sy && sy < yi) {
            crossings.push(xi + (sy - yi) * (xj - xi) / (yj - yi));
        }
        j = i;
    }
    crossings.sort_by(f64::total_cmp);
    crossings
}

/// Ray-casting point-in-polygon test in lon/lat space.
pub fn point_in_polygon(lon: f64, lat: f64, vertices: &[LonLat]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let [xi, yi] = vertices[i];
        let [xj, yj] = vertices[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::GeoBounds;

    /// One degree per pixel: lon [0, 64] east, lat [0, 64] with row 0 at lat 64.
    fn unit_frame() -> CoordinateFrame {
        let bounds = GeoBounds {
            lon_min: 0.0,
            lon_max: 64.0,
            lat_min: 0.0,
            lat_max: 64.0,
        };
        CoordinateFrame::new(bounds, 64, 64).unwrap()
    }

    /// Rectangle covering columns `x0..x1` and rows `y0..y1` (pixel edges).
    fn pixel_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<LonLat> {
        vec![
            [x0, 64.0 - y0],
            [x1, 64.0 - y0],
            [x1, 64.0 - y1],
            [x0, 64.0 - y1],
        ]
    }

    fn set_cells(mask: &Tilemap<u8>) -> Vec<(usize, usize)> {
        mask.iter()
            .filter(|(_, _, &v)| v != 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_unit_square_sets_exactly_one_pixel() {
        let frame = unit_frame();
        let mut mask = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut mask, &frame, &pixel_rect(10.0, 10.0, 11.0, 11.0), 1);
        assert_eq!(set_cells(&mask), vec![(10, 10)]);
    }

    #[test]
    fn test_aligned_square_covers_pixel_centres_only() {
        let frame = unit_frame();
        let mut mask = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut mask, &frame, &pixel_rect(2.0, 2.0, 5.0, 5.0), 1);

        let expected: Vec<(usize, usize)> = (2..5)
            .flat_map(|y| (2..5).map(move |x| (x, y)))
            .collect();
        assert_eq!(set_cells(&mask), expected);
    }

    #[test]
    fn test_carve_gives_set_difference() {
        let frame = unit_frame();
        let outer = pixel_rect(4.0, 4.0, 40.0, 30.0);
        let inner = vec![[10.0, 50.0], [30.0, 55.0], [25.0, 40.0], [12.0, 44.0]];

        let mut carved = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut carved, &frame, &outer, 1);
        fill_polygon(&mut carved, &frame, &inner, 0);

        let mut a = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut a, &frame, &outer, 1);
        let mut b = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut b, &frame, &inner, 1);
        assert!(b.count(|&v| v == 1) > 0);

        let expected = a.zip_map(&b, |&in_a, &in_b| u8::from(in_a == 1 && in_b == 0));
        assert_eq!(carved, expected);
    }

    #[test]
    fn test_concave_polygon_even_odd() {
        // A "U": two prongs joined at the bottom, gap between them.
        let frame = unit_frame();
        let u_shape = vec![
            [10.0, 50.0],
            [14.0, 50.0],
            [14.0, 40.0],
            [20.0, 40.0],
            [20.0, 50.0],
            [24.0, 50.0],
            [24.0, 36.0],
            [10.0, 36.0],
        ];
        let mut mask = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut mask, &frame, &u_shape, 1);

        // Row 18 (lat 45.5) crosses both prongs but not the gap.
        assert_eq!(*mask.get(11, 18), 1);
        assert_eq!(*mask.get(17, 18), 0);
        assert_eq!(*mask.get(22, 18), 1);
        // Row 26 (lat 37.5) is inside the base.
        assert_eq!(*mask.get(17, 26), 1);
    }

    #[test]
    fn test_polygon_past_edges_is_clipped() {
        let frame = unit_frame();
        let huge = vec![[-100.0, 200.0], [200.0, 200.0], [200.0, -100.0], [-100.0, -100.0]];
        let mut mask = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut mask, &frame, &huge, 1);
        assert_eq!(mask.count(|&v| v == 1), 64 * 64);

        let offscreen = pixel_rect(-20.0, -20.0, -5.0, -5.0);
        let mut mask = Tilemap::new_with(64, 64, 0u8);
        fill_polygon(&mut mask, &frame, &offscreen, 1);
        assert_eq!(mask.count(|&v| v == 1), 0);
    }

    #[test]
    fn test_float_grid_takes_exact_value() {
        let frame = unit_frame();
        let mut field = Tilemap::new_with(64, 64, -1.0f32);
        fill_polygon(&mut field, &frame, &pixel_rect(0.0, 0.0, 3.0, 2.0), 0.75);
        assert_eq!(field.count(|&v| v == 0.75), 6);
        assert_eq!(*field.get(3, 0), -1.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        assert!(point_in_polygon(5.0, 5.0, &square));
        assert!(!point_in_polygon(15.0, 5.0, &square));
        assert!(!point_in_polygon(5.0, -0.1, &square));
        assert!(!point_in_polygon(5.0, 5.0, &square[..2]));
    }
}
