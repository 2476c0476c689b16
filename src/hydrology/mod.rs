//! Drainage network extraction.
//!
//! Steepest-descent routing builds a [`FlowGraph`]; flux is accumulated over it
//! in descending-elevation order and soil depth is derived from slope and flux.
//! Every lookup here clamps at the grid edges.

mod config;
pub mod depression;
pub mod flow;
pub mod flux;
pub mod soil;

pub use config::{HydrologyConfig, OutletModel};
pub use depression::priority_flood_fill;
pub use flow::{route_flow, route_grid, FlowGraph, SINK};
pub use flux::{accumulate_flux, accumulate_uniform, descending_order, river_mask};
pub use soil::{descent_slopes, estimate_soil, SoilParams};
