//! Thermal erosion.
//!
//! Slope-limited mass redistribution driven by the angle of repose. The
//! operator is local and deterministic; callers decide how many steps to run.

mod config;
pub mod thermal;

pub use config::{ErosionConfig, ThermalMode};
pub use thermal::{erosion_flags, run_thermal, thermal_step, thermal_step_into, ErosionFlags};
