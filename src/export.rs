use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use image::{GrayImage, ImageBuffer, Rgb, RgbImage};
use serde::Serialize;
use tracing::info;

use crate::error::AtlasError;
use crate::masks::SEA_LEVEL;
use crate::pipeline::{Atlas, ElevationStats, GenerationParams};
use crate::projection::CoordinateFrame;
use crate::provinces::ProvinceStats;
use crate::tilemap::Tilemap;

pub const ELEVATION_FILE: &str = "heightmap.png";
pub const PROVINCES_FILE: &str = "provinces.png";
pub const SUMMARY_FILE: &str = "atlas.json";

/// Save elevation codes as an 8-bit grayscale PNG.
pub fn save_elevation(elevation: &Tilemap<u8>, path: &Path) -> Result<(), AtlasError> {
    let img: GrayImage = ImageBuffer::from_fn(elevation.width as u32, elevation.height as u32, |x, y| {
        image::Luma([*elevation.get(x as usize, y as usize)])
    });
    img.save(path).map_err(|source| AtlasError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Save province ids as an RGB PNG with the id in the red channel.
pub fn save_provinces(provinces: &Tilemap<u8>, path: &Path) -> Result<(), AtlasError> {
    let mut img: RgbImage = ImageBuffer::new(provinces.width as u32, provinces.height as u32);
    for (x, y, &id) in provinces.iter() {
        img.put_pixel(x as u32, y as u32, Rgb([id, 0, 0]));
    }
    img.save(path).map_err(|source| AtlasError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Run summary written beside the rasters.
#[derive(Debug, Serialize)]
pub struct AtlasSummary {
    pub generated: String,
    pub frame: CoordinateFrame,
    pub sea_level: u8,
    pub distance_transform: String,
    pub params: GenerationParams,
    pub elevation: ElevationStats,
    pub assignable_pixels: usize,
    pub provinces: Vec<ProvinceStats>,
}

impl AtlasSummary {
    pub fn from_atlas(atlas: &Atlas) -> Self {
        Self {
            generated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            frame: atlas.frame,
            sea_level: SEA_LEVEL,
            distance_transform: atlas.distance.to_string(),
            params: atlas.params,
            elevation: atlas.elevation_stats.clone(),
            assignable_pixels: atlas.province_stats.iter().map(|p| p.pixels).sum(),
            provinces: atlas.province_stats.clone(),
        }
    }
}

pub fn write_summary(summary: &AtlasSummary, path: &Path) -> Result<(), AtlasError> {
    let file = File::create(path).map_err(|source| AtlasError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush().map_err(|source| AtlasError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Paths of the files written by [`write_atlas`].
#[derive(Clone, Debug)]
pub struct AtlasFiles {
    pub elevation: PathBuf,
    pub provinces: PathBuf,
    pub summary: PathBuf,
}

/// Write both rasters and the summary into `out_dir`, creating it if needed.
pub fn write_atlas(atlas: &Atlas, out_dir: &Path) -> Result<AtlasFiles, AtlasError> {
    fs::create_dir_all(out_dir).map_err(|source| AtlasError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let files = AtlasFiles {
        elevation: out_dir.join(ELEVATION_FILE),
        provinces: out_dir.join(PROVINCES_FILE),
        summary: out_dir.join(SUMMARY_FILE),
    };

    save_elevation(&atlas.elevation, &files.elevation)?;
    info!(path = %files.elevation.display(), "saved elevation");
    save_provinces(&atlas.provinces, &files.provinces)?;
    info!(path = %files.provinces.display(), "saved provinces");
    write_summary(&AtlasSummary::from_atlas(atlas), &files.summary)?;
    info!(path = %files.summary.display(), "saved summary");

    Ok(files)
}
