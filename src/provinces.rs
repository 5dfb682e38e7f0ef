//! Nearest-capital province partition.
//!
//! Every assignable pixel (land inside the empire) takes the id of the capital
//! nearest to it in pixel space. Each pixel is an independent fold over the
//! capitals in authored order, updating only on a strictly smaller distance,
//! so an exact tie always goes to the capital listed first. Everything else
//! is 0.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::geography::ProvinceCapital;
use crate::projection::CoordinateFrame;
use crate::tilemap::Tilemap;

/// Id written where no province applies.
pub const NO_PROVINCE: u8 = 0;

/// A capital snapped to its pixel.
#[derive(Clone, Copy, Debug)]
struct Seat {
    id: u8,
    x: i64,
    y: i64,
}

pub fn partition_provinces(
    frame: &CoordinateFrame,
    capitals: &[ProvinceCapital],
    assignable: &Tilemap<bool>,
) -> Result<Tilemap<u8>, ConfigError> {
    if capitals.is_empty() {
        return Err(ConfigError::NoCapitals);
    }

    let seats: Vec<Seat> = capitals
        .iter()
        .map(|c| {
            let (x, y) = frame.lonlat_to_xy(c.lon, c.lat);
            debug!(id = c.id, name = %c.display_name(), x, y, "province seat");
            Seat { id: c.id, x, y }
        })
        .collect();

    let mut provinces = Tilemap::new_with(frame.width, frame.height, NO_PROVINCE);
    provinces.par_rows_mut().for_each(|(y, row)| {
        for (x, id) in row.iter_mut().enumerate() {
            if *assignable.get(x, y) {
                *id = nearest_seat(x as i64, y as i64, &seats);
            }
        }
    });

    Ok(provinces)
}

/// Ordered fold over the seats. Squared distances are exact integers, so ties
/// are exact; they saturate for seats far outside the frame.
fn nearest_seat(x: i64, y: i64, seats: &[Seat]) -> u8 {
    let mut best: Option<(i128, u8)> = None;
    for seat in seats {
        let dx = x as i128 - seat.x as i128;
        let dy = y as i128 - seat.y as i128;
        let d = dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy));
        match best {
            Some((min, _)) if d >= min => {}
            _ => best = Some((d, seat.id)),
        }
    }
    best.map_or(NO_PROVINCE, |(_, id)| id)
}

/// Pixel count of one province.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProvinceStats {
    pub id: u8,
    pub name: String,
    pub pixels: usize,
}

/// Per-capital pixel counts in authored order. Capitals that won no pixels
/// are listed with a count of 0.
pub fn province_stats(provinces: &Tilemap<u8>, capitals: &[ProvinceCapital]) -> Vec<ProvinceStats> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &id in provinces.as_slice() {
        if id != NO_PROVINCE {
            *counts.entry(id).or_default() += 1;
        }
    }

    capitals
        .iter()
        .map(|c| ProvinceStats {
            id: c.id,
            name: c.display_name(),
            pixels: counts.get(&c.id).copied().unwrap_or(0),
        })
        .collect()
}
