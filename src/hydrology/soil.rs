//! Soil depth from local slope and flux.

use super::flow::FlowGraph;
use super::HydrologyConfig;

/// Coefficients of `clamp(k_flux * ln(1 + flux) - k_slope * slope, 0, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilParams {
    pub k_flux: f64,
    pub k_slope: f64,
    pub max: f64,
    /// Horizontal distance between adjacent cells.
    pub cell_size: f64,
}

impl Default for SoilParams {
    fn default() -> Self {
        Self {
            k_flux: 1.0,
            k_slope: 1.0,
            max: 10.0,
            cell_size: 1.0,
        }
    }
}

impl SoilParams {
    /// Pulls the soil coefficients out of a hydrology config.
    pub fn from_config(cfg: &HydrologyConfig, cell_size: f64) -> Self {
        Self {
            k_flux: cfg.soil_k_flux,
            k_slope: cfg.soil_k_slope,
            max: cfg.soil_max,
            cell_size,
        }
    }

    /// Soil depth for one cell. Never negative, even if `max` is.
    #[inline]
    pub fn depth(&self, slope: f64, flux: f64) -> f64 {
        (self.k_flux * flux.ln_1p() - self.k_slope * slope).min(self.max).max(0.0)
    }
}

/// Downhill gradient along each cell's flow edge; 0 for sinks.
pub fn descent_slopes(elevation: &[f64], graph: &FlowGraph, cell_size: f64) -> Vec<f64> {
    assert_eq!(elevation.len(), graph.len());
    let w = graph.width();

    (0..graph.len())
        .map(|i| match graph.successor(i) {
            Some(s) => {
                let diagonal = i % w != s % w && i / w != s / w;
                let run = if diagonal { std::f64::consts::SQRT_2 } else { 1.0 } * cell_size;
                (elevation[i] - elevation[s]) / run
            }
            None => 0.0,
        })
        .collect()
}

/// Soil depth per cell.
///
/// Sinks are treated as flat, so they hold at least as much soil as any
/// non-sink cell with the same flux.
pub fn estimate_soil(elevation: &[f64], graph: &FlowGraph, flux: &[f64], params: &SoilParams) -> Vec<f64> {
    assert_eq!(flux.len(), graph.len());
    descent_slopes(elevation, graph, params.cell_size)
        .into_iter()
        .zip(flux)
        .map(|(slope, &f)| params.depth(slope, f))
        .collect()
}
