//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by grid construction, import, triangulation and export.
///
/// Operations either produce their full output or return one of these.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// Width or height is zero, or the elevation buffer does not match them.
    #[error("Invalid grid dimensions: {width}x{height} with {cells} cells")]
    InvalidDimensions {
        width: usize,
        height: usize,
        cells: usize,
    },
    /// A per-cell field handed to an exporter has the wrong length.
    #[error("Field length {actual} != expected {expected}")]
    FieldLength { expected: usize, actual: usize },
    /// The input raster could not be parsed.
    #[error("Failed to decode height image: {0}")]
    Decode(#[source] image::ImageError),
    /// The output sink rejected a write.
    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),
    /// The PNG encoder rejected the raster (counts as a write failure).
    #[error("Image encoding error: {0}")]
    Encode(#[source] image::ImageError),
    /// The Delaunay routine could not triangulate the sample points.
    #[error("Triangulation failed: {0}")]
    Triangulation(String),
    /// An options file could not be parsed.
    #[error("Invalid options: {0}")]
    Config(#[from] toml::de::Error),
}

impl TerrainError {
    /// Classifies an encoder error, keeping I/O failures as [`TerrainError::Write`].
    pub(crate) fn from_encode(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => TerrainError::Write(io),
            other => TerrainError::Encode(other),
        }
    }

    /// True for the write-failure kinds (`Write` and `Encode`).
    pub fn is_write_failure(&self) -> bool {
        matches!(self, TerrainError::Write(_) | TerrainError::Encode(_))
    }
}

/// Shorthand result type.
pub type Result<T> = std::result::Result<T, TerrainError>;
