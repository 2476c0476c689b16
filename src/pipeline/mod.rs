//! Pipeline module for orchestrating terrain processing stages.
//!
//! Provides a trait-based architecture for modular stages that can be
//! composed into a complete erosion, hydrology and meshing run.

mod config;
mod outputs;
mod stage;

pub use config::TerrainOptions;
pub use outputs::TerrainOutputs;
pub use stage::{
    BaseContribution, DepressionStage, ErosionStage, FluxStage, MeshStage, Pipeline, PipelineError,
    RoutingStage, SoilStage, StageId, TerrainStage, TerrainState,
};

use crate::terrain::HeightGrid;

fn finish(pipeline: &Pipeline, grid: HeightGrid) -> Result<TerrainOutputs, PipelineError> {
    let mut state = TerrainState::new(grid);
    pipeline.run(&mut state)?;
    TerrainOutputs::from_state(state)
}

/// Runs every stage, including triangulation.
pub fn run_terrain(grid: HeightGrid, options: &TerrainOptions) -> Result<TerrainOutputs, PipelineError> {
    finish(&Pipeline::standard(options.clone()), grid)
}

/// Runs erosion and hydrology only; works on grids too thin to triangulate.
pub fn run_hydrology(grid: HeightGrid, options: &TerrainOptions) -> Result<TerrainOutputs, PipelineError> {
    finish(&Pipeline::hydrology(options.clone()), grid)
}

/// Like [`run_terrain`], with a per-cell flux source in place of `rainfall`.
pub fn run_with_base<F>(grid: HeightGrid, options: &TerrainOptions, base: F) -> Result<TerrainOutputs, PipelineError>
where
    F: Fn(usize) -> f64 + Send + Sync + 'static,
{
    let mut pipeline = Pipeline::standard(options.clone());
    pipeline.replace_stage(FluxStage::with_base(base));
    finish(&pipeline, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::PngExportOptions;
    use tempfile::tempdir;

    fn bowl(n: usize) -> HeightGrid {
        let c = (n / 2) as f64;
        let z = (0..n * n)
            .map(|i| {
                let (x, y) = ((i % n) as f64, (i / n) as f64);
                (x - c).abs().max((y - c).abs())
            })
            .collect();
        HeightGrid::from_elevation(n, n, z, 1.0).unwrap()
    }

    #[test]
    fn test_run_terrain_bowl() {
        let out = run_terrain(bowl(5), &TerrainOptions::default()).unwrap();
        assert_eq!(out.flux[12], 25.0);
        assert_eq!(out.sink_mask.iter().filter(|&&s| s).count(), 1);
        assert!(out.triangulation.is_some());
    }

    #[test]
    fn test_run_hydrology_on_single_row() {
        let grid = HeightGrid::from_elevation(4, 1, vec![4.0, 3.0, 2.0, 1.0], 1.0).unwrap();
        let out = run_hydrology(grid, &TerrainOptions::default()).unwrap();
        assert_eq!(out.flux, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(out.triangulation.is_none());
    }

    #[test]
    fn test_run_with_base() {
        let out = run_with_base(bowl(3), &TerrainOptions::default(), |_| 2.0).unwrap();
        assert_eq!(out.flux[4], 18.0);
    }

    #[test]
    fn test_from_state_requires_hydrology() {
        let state = TerrainState::new(bowl(3));
        assert!(matches!(
            TerrainOutputs::from_state(state),
            Err(PipelineError::MissingDependency(_, _))
        ));
    }

    #[test]
    fn test_export_to_dir_applies_grid_vertical_scale() {
        let grid = HeightGrid::from_elevation(2, 2, vec![1.0, 2.0, 3.0, 4.0], 5.0).unwrap();
        let out = run_terrain(grid, &TerrainOptions::default()).unwrap();
        let dir = tempdir().unwrap();
        out.export_to_dir(dir.path(), "scaled", &PngExportOptions::default()).unwrap();

        let text = std::fs::read_to_string(dir.path().join("scaled.obj")).unwrap();
        let heights: Vec<f64> = text
            .lines()
            .filter(|l| l.starts_with("v "))
            .map(|l| l.split_whitespace().nth(2).unwrap().parse().unwrap())
            .collect();
        assert_eq!(text.lines().next(), Some("v 0 5 0"));
        assert_eq!(heights, vec![5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_export_to_dir_writes_all_files() {
        let out = run_terrain(bowl(5), &TerrainOptions::default()).unwrap();
        let dir = tempdir().unwrap();
        let written = out
            .export_to_dir(&dir.path().join("out"), "bowl", &PngExportOptions::default())
            .unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "bowl_elevation.png",
                "bowl_flux.png",
                "bowl_soil.png",
                "bowl_sinks.png",
                "bowl_rivers.png",
                "bowl.obj"
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }
}
