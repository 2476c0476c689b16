//! Processing stage trait and pipeline orchestration.

use thiserror::Error;

use crate::erosion::run_thermal;
use crate::error::TerrainError;
use crate::geometry::{triangulate_grid, Triangulation};
use crate::hydrology::{
    accumulate_flux, estimate_soil, priority_flood_fill, river_mask, route_flow, FlowGraph,
};
use crate::terrain::HeightGrid;
use super::TerrainOptions;

/// Per-cell flux source.
pub type BaseContribution = Box<dyn Fn(usize) -> f64 + Send + Sync>;

/// Unique identifier for processing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Iterated thermal erosion.
    Erosion,
    /// Optional depression filling of the routing surface.
    Depressions,
    /// Steepest-descent flow routing.
    Routing,
    /// Flux accumulation and river mask.
    Flux,
    /// Soil depth estimation.
    Soil,
    /// Delaunay triangulation for mesh export.
    Mesh,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Erosion => "erosion",
            StageId::Depressions => "depressions",
            StageId::Routing => "routing",
            StageId::Flux => "flux",
            StageId::Soil => "soil",
            StageId::Mesh => "mesh",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, #[source] TerrainError),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// Everything computed so far. Fields fill in as stages run.
#[derive(Debug, Clone)]
pub struct TerrainState {
    /// Height field, eroded in place by the erosion stage.
    pub grid: HeightGrid,
    /// Filled surface used for routing, when depression filling ran.
    pub routing_elevation: Option<Vec<f64>>,
    pub flow: Option<FlowGraph>,
    pub flux: Option<Vec<f64>>,
    pub river_mask: Option<Vec<bool>>,
    pub soil: Option<Vec<f64>>,
    pub triangulation: Option<Triangulation>,
}

impl TerrainState {
    pub fn new(grid: HeightGrid) -> Self {
        Self {
            grid,
            routing_elevation: None,
            flow: None,
            flux: None,
            river_mask: None,
            soil: None,
            triangulation: None,
        }
    }

    /// The surface flow is routed on: the filled one if present, else the grid.
    pub fn routing_surface(&self) -> &[f64] {
        self.routing_elevation.as_deref().unwrap_or(&self.grid.elevation)
    }

    /// Sink mask of the flow graph, if routing has run.
    pub fn sink_mask(&self) -> Option<Vec<bool>> {
        self.flow.as_ref().map(FlowGraph::sink_mask)
    }
}

/// Trait for implementing processing stages.
pub trait TerrainStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the stage, updating the state in place.
    fn execute(&self, state: &mut TerrainState, options: &TerrainOptions) -> Result<(), PipelineError>;
}

/// Orchestrates stages into a complete run.
pub struct Pipeline {
    stages: Vec<Box<dyn TerrainStage>>,
    options: TerrainOptions,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given options.
    pub fn new(options: TerrainOptions) -> Self {
        Self {
            stages: Vec::new(),
            options,
        }
    }

    /// Erosion, depressions, routing, flux and soil.
    pub fn hydrology(options: TerrainOptions) -> Self {
        let mut pipeline = Self::new(options);
        pipeline
            .add_stage(ErosionStage)
            .add_stage(DepressionStage)
            .add_stage(RoutingStage)
            .add_stage(FluxStage::uniform())
            .add_stage(SoilStage);
        pipeline
    }

    /// The hydrology stages followed by triangulation.
    pub fn standard(options: TerrainOptions) -> Self {
        let mut pipeline = Self::hydrology(options);
        pipeline.add_stage(MeshStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: TerrainStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Replaces the stage with the same id, or appends it.
    pub fn replace_stage<S: TerrainStage + 'static>(&mut self, stage: S) -> &mut Self {
        match self.stages.iter().position(|s| s.id() == stage.id()) {
            Some(pos) => self.stages[pos] = Box::new(stage),
            None => self.stages.push(Box::new(stage)),
        }
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn options(&self) -> &TerrainOptions {
        &self.options
    }

    /// Executes all stages in order.
    pub fn run(&self, state: &mut TerrainState) -> Result<(), PipelineError> {
        self.run_with_callbacks(state, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages, reporting progress around each one.
    pub fn run_with_callbacks<F1, F2>(
        &self,
        state: &mut TerrainState,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            log::debug!("[{}/{}] {}", i + 1, total, stage.name());
            stage.execute(state, &self.options)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Iterated thermal erosion.
pub struct ErosionStage;

impl TerrainStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        "Thermal Erosion"
    }

    fn execute(&self, state: &mut TerrainState, options: &TerrainOptions) -> Result<(), PipelineError> {
        run_thermal(&mut state.grid, &options.erosion);
        // Any surface derived from the old heights is stale now.
        state.routing_elevation = None;
        Ok(())
    }
}

/// Fills depressions when `fill_depressions` is set; otherwise routes on the raw grid.
pub struct DepressionStage;

impl TerrainStage for DepressionStage {
    fn id(&self) -> StageId {
        StageId::Depressions
    }

    fn name(&self) -> &str {
        "Depression Filling"
    }

    fn execute(&self, state: &mut TerrainState, options: &TerrainOptions) -> Result<(), PipelineError> {
        let hydro = &options.hydrology;
        state.routing_elevation = if hydro.fill_depressions {
            let grid = &state.grid;
            Some(priority_flood_fill(
                grid.width(),
                grid.height(),
                &grid.elevation,
                hydro.outlet,
                hydro.fill_epsilon,
                hydro.connectivity(),
            ))
        } else {
            None
        };
        Ok(())
    }
}

/// Steepest-descent routing, plus border sinks when `border_is_sink` is set.
pub struct RoutingStage;

impl TerrainStage for RoutingStage {
    fn id(&self) -> StageId {
        StageId::Routing
    }

    fn name(&self) -> &str {
        "Flow Routing"
    }

    fn execute(&self, state: &mut TerrainState, options: &TerrainOptions) -> Result<(), PipelineError> {
        let (w, h) = (state.grid.width(), state.grid.height());
        let mut flow = route_flow(w, h, state.routing_surface(), options.hydrology.connectivity());
        if options.hydrology.border_is_sink {
            flow.mark_border_sinks();
        }
        log::debug!("routing: {} sinks in {} cells", flow.sinks().len(), flow.len());
        state.flow = Some(flow);
        Ok(())
    }
}

/// Flux accumulation over the flow graph.
pub struct FluxStage {
    base: Option<BaseContribution>,
}

impl FluxStage {
    /// Uses the `rainfall` option for every cell.
    pub fn uniform() -> Self {
        Self { base: None }
    }

    /// Uses a per-cell source function.
    pub fn with_base<F>(base: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        Self {
            base: Some(Box::new(base)),
        }
    }
}

impl TerrainStage for FluxStage {
    fn id(&self) -> StageId {
        StageId::Flux
    }

    fn name(&self) -> &str {
        "Flux Accumulation"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Routing]
    }

    fn execute(&self, state: &mut TerrainState, options: &TerrainOptions) -> Result<(), PipelineError> {
        let flow = state
            .flow
            .as_ref()
            .ok_or_else(|| PipelineError::MissingDependency(self.name().to_string(), "routing".to_string()))?;

        let rainfall = options.hydrology.rainfall;
        let flux = match &self.base {
            Some(base) => accumulate_flux(state.routing_surface(), flow, base.as_ref()),
            None => accumulate_flux(state.routing_surface(), flow, |_| rainfall),
        };
        state.river_mask = Some(river_mask(&flux, options.hydrology.river_threshold));
        state.flux = Some(flux);
        Ok(())
    }
}

/// Soil depth from slope along the flow graph and flux.
pub struct SoilStage;

impl TerrainStage for SoilStage {
    fn id(&self) -> StageId {
        StageId::Soil
    }

    fn name(&self) -> &str {
        "Soil Estimation"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Flux]
    }

    fn execute(&self, state: &mut TerrainState, options: &TerrainOptions) -> Result<(), PipelineError> {
        let missing = |what: &str| PipelineError::MissingDependency(self.name().to_string(), what.to_string());
        let flow = state.flow.as_ref().ok_or_else(|| missing("routing"))?;
        let flux = state.flux.as_ref().ok_or_else(|| missing("flux"))?;
        let soil = estimate_soil(state.routing_surface(), flow, flux, &options.soil_params());
        state.soil = Some(soil);
        Ok(())
    }
}

/// Delaunay triangulation of the grid's sample points.
pub struct MeshStage;

impl TerrainStage for MeshStage {
    fn id(&self) -> StageId {
        StageId::Mesh
    }

    fn name(&self) -> &str {
        "Triangulation"
    }

    fn execute(&self, state: &mut TerrainState, _options: &TerrainOptions) -> Result<(), PipelineError> {
        let tri = triangulate_grid(state.grid.width(), state.grid.height())
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e))?;
        state.triangulation = Some(tri);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> HeightGrid {
        let z = (0..width * height).map(|i| (width * height - i) as f64).collect();
        HeightGrid::from_elevation(width, height, z, 1.0).unwrap()
    }

    #[test]
    fn test_pipeline_creation() {
        assert_eq!(Pipeline::new(TerrainOptions::default()).stage_count(), 0);
        assert_eq!(Pipeline::hydrology(TerrainOptions::default()).stage_count(), 5);
        assert_eq!(Pipeline::standard(TerrainOptions::default()).stage_count(), 6);
    }

    #[test]
    fn test_standard_pipeline_fills_state() {
        let mut state = TerrainState::new(ramp(4, 3));
        Pipeline::standard(TerrainOptions::default()).run(&mut state).unwrap();
        assert!(state.flow.is_some());
        assert!(state.flux.is_some());
        assert!(state.soil.is_some());
        assert!(state.river_mask.is_some());
        assert!(state.triangulation.is_some());
        assert!(state.routing_elevation.is_none());
    }

    #[test]
    fn test_missing_dependency_is_reported() {
        let mut pipeline = Pipeline::new(TerrainOptions::default());
        pipeline.add_stage(SoilStage);
        let err = pipeline.run(&mut TerrainState::new(ramp(3, 3))).unwrap_err();
        assert!(matches!(err, PipelineError::MissingDependency(ref s, ref d) if s == "Soil Estimation" && d == "flux"));
    }

    #[test]
    fn test_mesh_failure_is_surfaced() {
        let mut state = TerrainState::new(ramp(5, 1));
        let err = Pipeline::standard(TerrainOptions::default()).run(&mut state).unwrap_err();
        assert!(matches!(err, PipelineError::StageFailed(_, TerrainError::Triangulation(_))));
        // Hydrology finished before the mesh stage failed.
        assert!(state.soil.is_some());
    }

    #[test]
    fn test_custom_base_contribution() {
        let mut pipeline = Pipeline::hydrology(TerrainOptions::default());
        pipeline.replace_stage(FluxStage::with_base(|i| if i == 0 { 10.0 } else { 0.0 }));
        assert_eq!(pipeline.stage_count(), 5);

        let mut state = TerrainState::new(ramp(4, 1));
        pipeline.run(&mut state).unwrap();
        assert_eq!(state.flux.unwrap(), vec![10.0, 10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_depression_stage_uses_filled_surface() {
        let mut z = vec![5.0; 25];
        z[12] = 1.0;
        z[2] = 0.0;
        let grid = HeightGrid::from_elevation(5, 5, z, 1.0).unwrap();
        let mut options = TerrainOptions::default();
        options.hydrology.fill_depressions = true;

        let mut state = TerrainState::new(grid);
        Pipeline::hydrology(options).run(&mut state).unwrap();
        let filled = state.routing_elevation.as_ref().unwrap();
        assert!(filled[12] > 5.0);
        let flow = state.flow.as_ref().unwrap();
        assert!(!flow.is_sink(12));
    }

    #[test]
    fn test_callbacks_see_every_stage() {
        let mut started = Vec::new();
        let mut completed = 0;
        Pipeline::standard(TerrainOptions::default())
            .run_with_callbacks(
                &mut TerrainState::new(ramp(3, 3)),
                |name, _, _| started.push(name.to_string()),
                |_, _, _| completed += 1,
            )
            .unwrap();
        assert_eq!(started.first().map(String::as_str), Some("Thermal Erosion"));
        assert_eq!(started.len(), 6);
        assert_eq!(completed, 6);
    }
}
