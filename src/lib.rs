//! Terrain post-processing for raster height fields.
//!
//! This crate imports a greyscale heightmap, applies thermal erosion, extracts
//! a steepest-descent drainage network with accumulated flux and soil depth,
//! and exports the results as PNG rasters and a triangulated OBJ mesh.

pub mod error;
pub mod geometry;
pub mod terrain;
pub mod erosion;
pub mod hydrology;
pub mod export;
pub mod pipeline;

pub use error::{Result, TerrainError};
pub use geometry::{Connectivity, Direction, Triangulation};
pub use terrain::{HeightGrid, ImportScale};
pub use erosion::{ErosionConfig, ThermalMode};
pub use hydrology::{FlowGraph, HydrologyConfig, OutletModel, SoilParams, SINK};
pub use export::{Palette, PngExportOptions};
pub use pipeline::{
    run_hydrology, run_terrain, run_with_base, Pipeline, PipelineError, StageId, TerrainOptions,
    TerrainOutputs, TerrainStage, TerrainState,
};
