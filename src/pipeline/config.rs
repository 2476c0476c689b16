//! The single options record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erosion::ErosionConfig;
use crate::error::Result;
use crate::hydrology::{HydrologyConfig, SoilParams};
use crate::terrain::ImportScale;

/// Every tunable of the pipeline in one flat table.
///
/// The erosion and hydrology sections are flattened, so a TOML file reads:
///
/// ```toml
/// vertical_scale = 100.0
/// erosion_iterations = 20
/// tan_threshold = 0.6
/// border_is_sink = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainOptions {
    /// Multiplier for elevation values (import and mesh heights).
    #[serde(default = "default_vertical_scale")]
    pub vertical_scale: f64,
    /// How greyscale input is combined with `vertical_scale`.
    #[serde(default)]
    pub import_scale: ImportScale,
    #[serde(flatten)]
    pub erosion: ErosionConfig,
    #[serde(flatten)]
    pub hydrology: HydrologyConfig,
}

fn default_vertical_scale() -> f64 {
    100.0
}

impl Default for TerrainOptions {
    fn default() -> Self {
        Self {
            vertical_scale: default_vertical_scale(),
            import_scale: ImportScale::default(),
            erosion: ErosionConfig::default(),
            hydrology: HydrologyConfig::default(),
        }
    }
}

impl TerrainOptions {
    /// Parses options from TOML; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Soil coefficients, with the erosion cell size as horizontal spacing.
    pub fn soil_params(&self) -> SoilParams {
        SoilParams::from_config(&self.hydrology, self.erosion.cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erosion::ThermalMode;
    use crate::hydrology::OutletModel;
    use crate::error::TerrainError;

    #[test]
    fn test_defaults_match_documented_table() {
        let o = TerrainOptions::default();
        assert_eq!(o.vertical_scale, 100.0);
        assert_eq!(o.erosion.erosion_iterations, 0);
        assert_eq!(o.erosion.cell_size, 1.0);
        assert_eq!(o.erosion.amplitude, 0.1);
        assert_eq!(o.erosion.tan_threshold, 0.6);
        assert!(o.hydrology.allow_diagonals);
        assert!(!o.hydrology.border_is_sink);
        assert_eq!(o.hydrology.rainfall, 1.0);
    }

    #[test]
    fn test_flat_toml() {
        let o = TerrainOptions::from_toml_str(
            r#"
            vertical_scale = 50
            erosion_iterations = 12
            thermal_mode = "pairwise"
            border_is_sink = true
            soil_max = 3.5
            outlet = { sea_level = 0.25 }
            import_scale = "reference"
            "#,
        )
        .unwrap();
        assert_eq!(o.vertical_scale, 50.0);
        assert_eq!(o.erosion.erosion_iterations, 12);
        assert_eq!(o.erosion.thermal_mode, ThermalMode::Pairwise);
        assert_eq!(o.erosion.tan_threshold, 0.6);
        assert!(o.hydrology.border_is_sink);
        assert_eq!(o.hydrology.soil_max, 3.5);
        assert_eq!(o.hydrology.outlet, OutletModel::SeaLevel(0.25));
        assert_eq!(o.import_scale, ImportScale::Reference);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(TerrainOptions::from_toml_str("").unwrap(), TerrainOptions::default());
    }

    #[test]
    fn test_malformed_toml() {
        let err = TerrainOptions::from_toml_str("vertical_scale = [").unwrap_err();
        assert!(matches!(err, TerrainError::Config(_)));
    }

    #[test]
    fn test_soil_params_pick_up_cell_size() {
        let mut o = TerrainOptions::default();
        o.erosion.cell_size = 2.5;
        o.hydrology.soil_k_slope = 0.3;
        let p = o.soil_params();
        assert_eq!(p.cell_size, 2.5);
        assert_eq!(p.k_slope, 0.3);
    }
}
