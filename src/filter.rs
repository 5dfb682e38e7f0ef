//! Smoothing kernels over scalar grids. Edges replicate the border pixel.

use rayon::prelude::*;
use serde::Serialize;

use crate::tilemap::Tilemap;

/// Post-blend smoothing of the combined elevation field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Smoothing {
    None,
    Gaussian { sigma: f32 },
    /// Unweighted 3x3 mean, repeated.
    Box { passes: usize },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Gaussian { sigma: 1.5 }
    }
}

impl Smoothing {
    pub fn apply(&self, field: &Tilemap<f32>) -> Tilemap<f32> {
        match *self {
            Smoothing::None => field.clone(),
            Smoothing::Gaussian { sigma } => gaussian_blur(field, sigma),
            Smoothing::Box { passes } => box_blur(field, passes),
        }
    }
}

/// Normalized 1D Gaussian kernel truncated at 4 sigma. `None` when sigma is
/// too small for `2σ²` to be a normal float; such a kernel is the identity.
fn gaussian_kernel(sigma: f32) -> Option<Vec<f32>> {
    let two_sigma_sq = 2.0 * sigma * sigma;
    if !(sigma > 0.0) || !two_sigma_sq.is_normal() {
        return None;
    }
    let radius = (4.0 * sigma).ceil().max(1.0) as usize;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    Some(kernel)
}

/// Separable Gaussian blur. A non-positive or vanishingly small sigma returns
/// the field as is.
pub fn gaussian_blur(field: &Tilemap<f32>, sigma: f32) -> Tilemap<f32> {
    let Some(kernel) = gaussian_kernel(sigma) else {
        return field.clone();
    };
    let radius = (kernel.len() / 2) as i64;
    let (width, height) = (field.width as i64, field.height as i64);

    // Horizontal pass.
    let mut horizontal = Tilemap::new_with(field.width, field.height, 0.0f32);
    horizontal.par_rows_mut().for_each(|(y, row)| {
        let src = field.row(y);
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = (x as i64 + k as i64 - radius).clamp(0, width - 1) as usize;
                acc += src[sx] * w;
            }
            *out = acc;
        }
    });

    // Vertical pass.
    let mut result = Tilemap::new_with(field.width, field.height, 0.0f32);
    result.par_rows_mut().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = (y as i64 + k as i64 - radius).clamp(0, height - 1) as usize;
                acc += *horizontal.get(x, sy) * w;
            }
            *out = acc;
        }
    });

    result
}

/// Unweighted 3x3 mean applied `passes` times.
pub fn box_blur(field: &Tilemap<f32>, passes: usize) -> Tilemap<f32> {
    let mut current = field.clone();
    let (width, height) = (field.width as i64, field.height as i64);

    for _ in 0..passes {
        let src = &current;
        let mut next = Tilemap::new_with(field.width, field.height, 0.0f32);
        next.par_rows_mut().for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for dy in -1..=1i64 {
                    let sy = (y as i64 + dy).clamp(0, height - 1) as usize;
                    for dx in -1..=1i64 {
                        let sx = (x as i64 + dx).clamp(0, width - 1) as usize;
                        sum += *src.get(sx, sy);
                    }
                }
                *out = sum / 9.0;
            }
        });
        current = next;
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(size: usize, value: f32) -> Tilemap<f32> {
        let mut field = Tilemap::new_with(size, size, 0.0f32);
        field.set(size / 2, size / 2, value);
        field
    }

    fn total(field: &Tilemap<f32>) -> f32 {
        field.iter().map(|(_, _, &v)| v).sum()
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(1.5).unwrap();
        assert_eq!(kernel.len(), 2 * 6 + 1);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        for i in 0..kernel.len() / 2 {
            assert_eq!(kernel[i], kernel[kernel.len() - 1 - i]);
        }
    }

    #[test]
    fn test_constant_field_is_preserved() {
        let field = Tilemap::new_with(9, 7, 42.0f32);
        for smoothing in [
            Smoothing::Gaussian { sigma: 1.5 },
            Smoothing::Box { passes: 2 },
            Smoothing::None,
        ] {
            let out = smoothing.apply(&field);
            for (_, _, &v) in out.iter() {
                assert!((v - 42.0).abs() < 1e-4, "{smoothing:?} gave {v}");
            }
        }
    }

    #[test]
    fn test_gaussian_spreads_impulse_and_keeps_mass() {
        let field = impulse(31, 100.0);
        let out = gaussian_blur(&field, 1.5);
        assert!(*out.get(15, 15) < 100.0);
        assert!(*out.get(16, 15) > 0.0);
        assert!((*out.get(14, 15) - *out.get(16, 15)).abs() < 1e-5);
        assert!((total(&out) - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_box_single_pass_is_mean_of_neighbourhood() {
        let field = impulse(5, 9.0);
        let out = box_blur(&field, 1);
        assert!((*out.get(2, 2) - 1.0).abs() < 1e-6);
        assert!((*out.get(1, 1) - 1.0).abs() < 1e-6);
        assert_eq!(*out.get(0, 0), 0.0);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let field = impulse(5, 3.0);
        assert_eq!(gaussian_blur(&field, 0.0), field);
    }

    #[test]
    fn test_underflowing_sigma_is_identity() {
        let field = impulse(9, 60.0);
        for sigma in [1e-30, f32::MIN_POSITIVE, 1e-20] {
            let out = gaussian_blur(&field, sigma);
            assert_eq!(out.count(|v| v.is_nan()), 0, "sigma {sigma}");
            assert_eq!(out, field);
        }
    }
}
