//! Hydrology configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::Connectivity;

/// Where depression filling starts draining from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutletModel {
    /// Every cell on the outer ring of the grid is an outlet.
    #[default]
    Border,
    /// Every cell at or below the given height is an outlet.
    SeaLevel(f64),
}

/// Parameters for routing, flux accumulation and soil estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrologyConfig {
    /// Route over all eight neighbours; otherwise only N, E, S, W.
    pub allow_diagonals: bool,
    /// Turn every border cell into a sink before accumulating flux.
    pub border_is_sink: bool,
    /// Uniform per-cell flux source.
    pub rainfall: f64,
    /// Soil gained per unit of `ln(1 + flux)`.
    pub soil_k_flux: f64,
    /// Soil lost per unit of downhill slope.
    pub soil_k_slope: f64,
    /// Upper bound on soil depth.
    pub soil_max: f64,
    /// Fill closed depressions before routing.
    pub fill_depressions: bool,
    /// Minimum rise per cell when filling, so filled flats still drain. 0 leaves flats flat.
    pub fill_epsilon: f64,
    /// Where filled terrain drains to.
    pub outlet: OutletModel,
    /// Flux at or above which a cell is part of the river mask.
    pub river_threshold: f64,
}

impl Default for HydrologyConfig {
    fn default() -> Self {
        Self {
            allow_diagonals: true,
            border_is_sink: false,
            rainfall: 1.0,
            soil_k_flux: 1.0,
            soil_k_slope: 1.0,
            soil_max: 10.0,
            fill_depressions: false,
            fill_epsilon: 1e-6,
            outlet: OutletModel::default(),
            river_threshold: 100.0,
        }
    }
}

impl HydrologyConfig {
    /// Neighbourhood used by routing, slopes and filling.
    pub fn connectivity(&self) -> Connectivity {
        Connectivity::from_diagonals(self.allow_diagonals)
    }
}
