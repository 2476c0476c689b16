//! Erosion configuration.

use serde::{Deserialize, Serialize};

/// How a thermal step turns steep-neighbour tests into height changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalMode {
    /// `+amplitude` if any neighbour is steeply above, `-amplitude` if any is steeply below.
    #[default]
    Flag,
    /// `amplitude` moves once per steep neighbour pair, so the torus total is preserved.
    Pairwise,
}

/// Parameters for thermal erosion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    /// Number of thermal steps to apply.
    pub erosion_iterations: u32,
    /// Horizontal distance between adjacent cells.
    pub cell_size: f64,
    /// Height moved per step when the threshold is exceeded.
    pub amplitude: f64,
    /// Tangent of the angle of repose. 0.6 is roughly 31 degrees.
    pub tan_threshold: f64,
    /// Flag (default) or pairwise transfer.
    pub thermal_mode: ThermalMode,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            erosion_iterations: 0,
            cell_size: 1.0,
            amplitude: 0.1,
            tan_threshold: 0.6,
            thermal_mode: ThermalMode::default(),
        }
    }
}

impl ErosionConfig {
    /// Builds a config from an angle of repose in degrees.
    pub fn with_repose_degrees(degrees: f64) -> Self {
        Self {
            tan_threshold: degrees.to_radians().tan(),
            ..Default::default()
        }
    }
}
