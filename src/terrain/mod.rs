//! Terrain data.
//!
//! Provides the [`HeightGrid`] raster and its greyscale image import.

mod grid;
mod import;

pub use grid::{field_range, HeightGrid};
pub use import::{decode_heightmap, from_greyscale, load_heightmap, ImportScale};
