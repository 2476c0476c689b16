//! Height field import from greyscale or RGB rasters.

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use super::grid::HeightGrid;

/// Full-scale value of a channel after normalisation: three channels sum to 100.
const CHANNEL_FULL_SCALE: f64 = 100.0;

/// How normalised pixel values are combined with `vertical_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportScale {
    /// Mean channel value in `[0, 100]`, times `vertical_scale / 100`: range `[0, vertical_scale]`.
    #[default]
    Normalised,
    /// Mean channel value in `[0, 100]`, times `vertical_scale`: range `[0, 100 * vertical_scale]`.
    Reference,
}

impl ImportScale {
    fn factor(self, vertical_scale: f64) -> f64 {
        match self {
            ImportScale::Normalised => vertical_scale / CHANNEL_FULL_SCALE,
            ImportScale::Reference => vertical_scale,
        }
    }
}

/// Builds a grid from an image; pixel `(x, y)` becomes cell `y * width + x`.
///
/// Elevation is the mean of the R, G and B channels read at 16 bits, mapped to
/// `[0, 100]`, then scaled according to `scale`. Alpha is ignored. The
/// returned grid has a mesh `vertical_scale` of 1.0.
pub fn from_greyscale(img: &DynamicImage, vertical_scale: f64, scale: ImportScale) -> Result<HeightGrid> {
    let rgb = img.to_rgb16();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let factor = scale.factor(vertical_scale);

    let elevation: Vec<f64> = rgb
        .pixels()
        .map(|p| {
            let sum = p.0.iter().map(|&c| f64::from(c)).sum::<f64>();
            (sum / 3.0) * (CHANNEL_FULL_SCALE / f64::from(u16::MAX)) * factor
        })
        .collect();

    // The scale is baked into the elevations.
    HeightGrid::from_elevation(width, height, elevation, 1.0)
}

/// Decodes an in-memory PNG (or any format `image` was built with) into a grid.
pub fn decode_heightmap(bytes: &[u8], vertical_scale: f64, scale: ImportScale) -> Result<HeightGrid> {
    let img = image::load_from_memory(bytes).map_err(TerrainError::Decode)?;
    from_greyscale(&img, vertical_scale, scale)
}

/// Loads a height image from disk.
pub fn load_heightmap(path: &Path, vertical_scale: f64, scale: ImportScale) -> Result<HeightGrid> {
    let img = image::open(path).map_err(TerrainError::Decode)?;
    log::debug!("decoded {} ({}x{})", path.display(), img.width(), img.height());
    from_greyscale(&img, vertical_scale, scale)
}
