//! Distance from each pixel of a binary mask to the nearest pixel outside it.
//!
//! Two interchangeable strategies implement [`DistanceTransform`]: an exact
//! Euclidean transform (feature `exact-edt`, backed by imageproc) and a
//! lower-fidelity blur approximation that needs nothing beyond this crate.
//! [`DistanceStrategy::select`] picks one once at startup.

use serde::Serialize;
#[cfg(not(feature = "exact-edt"))]
use tracing::warn;

use crate::filter::gaussian_blur;
use crate::tilemap::Tilemap;

pub trait DistanceTransform: Sync {
    fn name(&self) -> &'static str;

    /// Per-pixel distance, in pixels, from each cell inside `mask` to the
    /// nearest cell outside it. Cells outside the mask read 0. When the mask
    /// covers the whole grid every cell reads infinity.
    fn distance_to_edge(&self, mask: &Tilemap<bool>) -> Tilemap<f32>;
}

/// Which strategy the caller asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    /// Exact when compiled in, otherwise the approximation.
    #[default]
    Auto,
    Exact,
    Approximate,
}

/// `None` when the mask has at least one outside cell.
fn saturated(mask: &Tilemap<bool>) -> Option<Tilemap<f32>> {
    if mask.as_slice().iter().all(|&inside| inside) {
        Some(Tilemap::new_with(mask.width, mask.height, f32::INFINITY))
    } else {
        None
    }
}

/// Exact Euclidean distance transform.
#[cfg(feature = "exact-edt")]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExactEdt;

#[cfg(feature = "exact-edt")]
impl DistanceTransform for ExactEdt {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn distance_to_edge(&self, mask: &Tilemap<bool>) -> Tilemap<f32> {
        use image::{GrayImage, Luma};
        use imageproc::distance_transform::euclidean_squared_distance_transform;

        if let Some(full) = saturated(mask) {
            return full;
        }

        // imageproc measures distance to the nearest non-zero pixel, so the
        // outside of the mask is the foreground.
        let outside = GrayImage::from_fn(mask.width as u32, mask.height as u32, |x, y| {
            if *mask.get(x as usize, y as usize) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });
        let squared = euclidean_squared_distance_transform(&outside);

        let mut dist = Tilemap::new_with(mask.width, mask.height, 0.0f32);
        for (x, y, d) in dist.iter_mut() {
            *d = squared.get_pixel(x as u32, y as u32)[0].sqrt() as f32;
        }
        dist
    }
}

/// Gaussian-blurred copy of the mask, scaled. Monotone in distance near the
/// edge but saturates at `scale` a few sigmas inland.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurApproximation {
    pub sigma: f32,
    pub scale: f32,
}

impl Default for BlurApproximation {
    fn default() -> Self {
        Self {
            sigma: 6.0,
            scale: 10.0,
        }
    }
}

impl DistanceTransform for BlurApproximation {
    fn name(&self) -> &'static str {
        "approximate"
    }

    fn distance_to_edge(&self, mask: &Tilemap<bool>) -> Tilemap<f32> {
        if let Some(full) = saturated(mask) {
            return full;
        }

        let coverage = mask.map(|&inside| if inside { 1.0f32 } else { 0.0 });
        let blurred = gaussian_blur(&coverage, self.sigma);
        blurred.zip_map(mask, |&v, &inside| {
            if inside {
                v * self.scale
            } else {
                0.0
            }
        })
    }
}

/// The distance transform chosen for this run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistanceStrategy {
    #[cfg(feature = "exact-edt")]
    Exact(ExactEdt),
    Approximate(BlurApproximation),
}

impl DistanceStrategy {
    /// Whether the exact transform was compiled in.
    pub const fn exact_available() -> bool {
        cfg!(feature = "exact-edt")
    }

    pub fn detect() -> Self {
        Self::select(DistanceMode::Auto)
    }

    /// Resolve a requested mode against what is compiled in. Asking for the
    /// exact transform without it falls back to the approximation.
    pub fn select(mode: DistanceMode) -> Self {
        match mode {
            DistanceMode::Approximate => Self::Approximate(BlurApproximation::default()),
            DistanceMode::Auto | DistanceMode::Exact => {
                #[cfg(feature = "exact-edt")]
                {
                    Self::Exact(ExactEdt)
                }
                #[cfg(not(feature = "exact-edt"))]
                {
                    warn!(
                        requested = ?mode,
                        "exact distance transform not compiled in; using blur approximation"
                    );
                    Self::Approximate(BlurApproximation::default())
                }
            }
        }
    }

    fn inner(&self) -> &dyn DistanceTransform {
        match self {
            #[cfg(feature = "exact-edt")]
            Self::Exact(edt) => edt,
            Self::Approximate(blur) => blur,
        }
    }
}

impl DistanceTransform for DistanceStrategy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn distance_to_edge(&self, mask: &Tilemap<bool>) -> Tilemap<f32> {
        self.inner().distance_to_edge(mask)
    }
}
