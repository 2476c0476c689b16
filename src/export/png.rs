//! PNG raster export for scalar fields and masks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{Result, TerrainError};
use crate::terrain::field_range;
use super::palette::{unit_to_u16, unit_to_u8, Palette};

/// Sample depth for greyscale scalar rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterDepth {
    /// 8-bit samples, `[0, 255]`.
    #[default]
    Eight,
    /// 16-bit samples, `[0, 65535]`. Only used with [`Palette::Grey`].
    Sixteen,
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Colour mapping for scalar fields; masks are always greyscale.
    pub palette: Palette,
    /// Sample depth for greyscale output.
    pub depth: RasterDepth,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            palette: Palette::Grey,
            depth: RasterDepth::Eight,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Default options with a palette.
    pub fn with_palette(palette: Palette) -> Self {
        Self {
            palette,
            ..Default::default()
        }
    }
}

/// Linear map of `[min, max]` to `[0, 1]`. A constant field maps to 0.
pub fn normalize_linear(field: &[f64]) -> Vec<f64> {
    let (min, max) = field_range(field);
    let range = max - min;
    if !(range > 0.0) {
        return vec![0.0; field.len()];
    }
    field.iter().map(|&v| (v - min) / range).collect()
}

/// `ln(1 + flux) / ln(1 + max_flux)`, stretching the heavy upper tail.
pub fn normalize_log1p(flux: &[f64]) -> Vec<f64> {
    let (_, max) = field_range(flux);
    let top = max.max(0.0).ln_1p();
    if !(top > 0.0) {
        return vec![0.0; flux.len()];
    }
    flux.iter().map(|&f| f.max(0.0).ln_1p() / top).collect()
}

fn dims(width: usize, height: usize, len: usize) -> Result<(u32, u32)> {
    if len != width * height {
        return Err(TerrainError::FieldLength {
            expected: width * height,
            actual: len,
        });
    }
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(TerrainError::InvalidDimensions { width, height, cells: len }),
    }
}

fn encode<W: Write>(writer: W, bytes: &[u8], w: u32, h: u32, color: ExtendedColorType, options: &PngExportOptions) -> Result<()> {
    let mut out = BufWriter::new(writer);
    {
        let encoder = PngEncoder::new_with_quality(&mut out, options.compression, options.filter);
        encoder.write_image(bytes, w, h, color).map_err(TerrainError::from_encode)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes a field already normalised to `[0, 1]`, using the palette and depth in `options`.
pub fn write_unit_png<W: Write>(
    writer: W,
    width: usize,
    height: usize,
    unit: &[f64],
    options: &PngExportOptions,
) -> Result<()> {
    let (w, h) = dims(width, height, unit.len())?;

    match (options.palette, options.depth) {
        (Palette::Grey, RasterDepth::Sixteen) => {
            let samples: Vec<u16> = unit.iter().map(|&t| unit_to_u16(t)).collect();
            let bytes: &[u8] = bytemuck::cast_slice(&samples);
            encode(writer, bytes, w, h, ExtendedColorType::L16, options)
        }
        (Palette::Grey, RasterDepth::Eight) => {
            let samples: Vec<u8> = unit.iter().map(|&t| unit_to_u8(t)).collect();
            encode(writer, &samples, w, h, ExtendedColorType::L8, options)
        }
        (palette, _) => {
            let samples: Vec<u8> = unit.iter().flat_map(|&t| palette.rgb(t)).collect();
            encode(writer, &samples, w, h, ExtendedColorType::Rgb8, options)
        }
    }
}

/// Elevation mapped linearly over its own `[min, max]`.
pub fn write_elevation_png<W: Write>(
    writer: W,
    width: usize,
    height: usize,
    elevation: &[f64],
    options: &PngExportOptions,
) -> Result<()> {
    write_unit_png(writer, width, height, &normalize_linear(elevation), options)
}

/// Flux mapped through `log1p`.
pub fn write_flux_png<W: Write>(
    writer: W,
    width: usize,
    height: usize,
    flux: &[f64],
    options: &PngExportOptions,
) -> Result<()> {
    write_unit_png(writer, width, height, &normalize_log1p(flux), options)
}

/// Soil mapped linearly over `[0, max soil]`.
pub fn write_soil_png<W: Write>(
    writer: W,
    width: usize,
    height: usize,
    soil: &[f64],
    options: &PngExportOptions,
) -> Result<()> {
    let (_, max) = field_range(soil);
    let unit: Vec<f64> = if max > 0.0 {
        soil.iter().map(|&s| s / max).collect()
    } else {
        vec![0.0; soil.len()]
    };
    write_unit_png(writer, width, height, &unit, options)
}

/// Binary mask: 255 where set, 0 elsewhere, 8-bit greyscale.
pub fn write_mask_png<W: Write>(
    writer: W,
    width: usize,
    height: usize,
    mask: &[bool],
    options: &PngExportOptions,
) -> Result<()> {
    let (w, h) = dims(width, height, mask.len())?;
    let samples: Vec<u8> = mask.iter().map(|&m| if m { 255 } else { 0 }).collect();
    encode(writer, &samples, w, h, ExtendedColorType::L8, options)
}

/// Which derived field a raster shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    Elevation,
    Flux,
    Soil,
}

/// Writes a scalar raster to `path`, choosing the mapping for `kind`.
pub fn export_field_png(
    path: &Path,
    kind: RasterKind,
    width: usize,
    height: usize,
    field: &[f64],
    options: &PngExportOptions,
) -> Result<()> {
    let file = File::create(path)?;
    match kind {
        RasterKind::Elevation => write_elevation_png(file, width, height, field, options),
        RasterKind::Flux => write_flux_png(file, width, height, field, options),
        RasterKind::Soil => write_soil_png(file, width, height, field, options),
    }
}

/// Writes a mask raster to `path`.
pub fn export_mask_png(
    path: &Path,
    width: usize,
    height: usize,
    mask: &[bool],
    options: &PngExportOptions,
) -> Result<()> {
    let file = File::create(path)?;
    write_mask_png(file, width, height, mask, options)
}
