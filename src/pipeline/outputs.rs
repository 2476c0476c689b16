//! Finished results of a pipeline run and their on-disk form.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::export::{export_field_png, export_mask_png, export_obj, PngExportOptions, RasterKind};
use crate::geometry::Triangulation;
use crate::hydrology::FlowGraph;
use crate::terrain::HeightGrid;
use super::stage::{PipelineError, TerrainState};

/// Every derived field for one height grid.
#[derive(Debug, Clone)]
pub struct TerrainOutputs {
    /// Eroded grid.
    pub grid: HeightGrid,
    pub flow: FlowGraph,
    pub flux: Vec<f64>,
    pub soil: Vec<f64>,
    pub sink_mask: Vec<bool>,
    pub river_mask: Vec<bool>,
    /// Present when the mesh stage ran.
    pub triangulation: Option<Triangulation>,
}

impl TerrainOutputs {
    /// Collects a state whose hydrology stages have all run.
    pub fn from_state(state: TerrainState) -> std::result::Result<Self, PipelineError> {
        let missing = |what: &str| PipelineError::MissingDependency("outputs".to_string(), what.to_string());
        let flow = state.flow.ok_or_else(|| missing("routing"))?;
        let flux = state.flux.ok_or_else(|| missing("flux"))?;
        let soil = state.soil.ok_or_else(|| missing("soil"))?;
        let river_mask = state.river_mask.ok_or_else(|| missing("flux"))?;
        Ok(Self {
            sink_mask: flow.sink_mask(),
            grid: state.grid,
            flow,
            flux,
            soil,
            river_mask,
            triangulation: state.triangulation,
        })
    }

    /// Writes the rasters and, if triangulated, the mesh into `dir`.
    ///
    /// Files are named `<base_name>_elevation.png`, `_flux.png`, `_soil.png`,
    /// `_sinks.png`, `_rivers.png` and `<base_name>.obj`. Returns the paths
    /// written, in that order.
    pub fn export_to_dir(&self, dir: &Path, base_name: &str, options: &PngExportOptions) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let (w, h) = (self.grid.width(), self.grid.height());
        let mut written = Vec::new();

        let fields = [
            ("elevation", RasterKind::Elevation, &self.grid.elevation),
            ("flux", RasterKind::Flux, &self.flux),
            ("soil", RasterKind::Soil, &self.soil),
        ];
        for (suffix, kind, field) in fields {
            let path = dir.join(format!("{}_{}.png", base_name, suffix));
            export_field_png(&path, kind, w, h, field, options)?;
            written.push(path);
        }

        for (suffix, mask) in [("sinks", &self.sink_mask), ("rivers", &self.river_mask)] {
            let path = dir.join(format!("{}_{}.png", base_name, suffix));
            export_mask_png(&path, w, h, mask, options)?;
            written.push(path);
        }

        if let Some(tri) = &self.triangulation {
            let path = dir.join(format!("{}.obj", base_name));
            export_obj(&path, tri, &self.grid.elevation, self.grid.vertical_scale)?;
            written.push(path);
        }

        log::debug!("exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}
