//! Slope-limited thermal erosion on a toroidal grid.
//!
//! Each cell looks at its wrapped 3x3 block in the previous buffer only, so a
//! step is independent of processing order and rows can be computed in parallel.
//! The wrap avoids edge damage when the step is iterated; it is the only place
//! in the crate where the grid wraps.
//!
//! Slopes are compared strictly against `tan_threshold`, so terraces exactly at
//! the angle of repose stay put. An `amplitude` close to rounding error will drift.

use rayon::prelude::*;

use crate::erosion::{ErosionConfig, ThermalMode};
use crate::geometry::neighbors::{neighbor_wrapped, Direction};
use crate::terrain::HeightGrid;

/// Per-cell outcome of the steepness test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErosionFlags {
    /// Some wrapped neighbour is steeply above this cell.
    pub will_receive: bool,
    /// Some wrapped neighbour is steeply below this cell.
    pub will_distribute: bool,
}

impl ErosionFlags {
    /// True if the cell changes under [`ThermalMode::Flag`] with non-zero amplitude,
    /// or sits on a saddle where both flags cancel.
    pub fn is_active(self) -> bool {
        self.will_receive || self.will_distribute
    }
}

/// Counts of steeply-higher and steeply-lower neighbours in the wrapped 3x3 block.
#[inline]
fn steep_counts(z: &[f64], width: usize, height: usize, x: usize, y: usize, cfg: &ErosionConfig) -> (u32, u32) {
    let z0 = z[y * width + x];
    let mut higher = 0u32;
    let mut lower = 0u32;
    for dir in Direction::ALL {
        let (nx, ny) = neighbor_wrapped(width, height, x, y, dir);
        let zn = z[ny * width + nx];
        if (zn - z0) / cfg.cell_size > cfg.tan_threshold {
            higher += 1;
        }
        if (z0 - zn) / cfg.cell_size > cfg.tan_threshold {
            lower += 1;
        }
    }
    (higher, lower)
}

/// Returns the receive/distribute flags for every cell.
pub fn erosion_flags(grid: &HeightGrid, cfg: &ErosionConfig) -> Vec<ErosionFlags> {
    let (w, h) = (grid.width(), grid.height());
    grid.cell_coords()
        .map(|(x, y)| {
            let (higher, lower) = steep_counts(&grid.elevation, w, h, x, y, cfg);
            ErosionFlags {
                will_receive: higher > 0,
                will_distribute: lower > 0,
            }
        })
        .collect()
}

/// One thermal step from `grid` into `z_out`.
///
/// # Panics
/// Panics if `z_out.len() != grid.len()`.
pub fn thermal_step_into(grid: &HeightGrid, z_out: &mut [f64], cfg: &ErosionConfig) {
    assert_eq!(z_out.len(), grid.len());
    let (w, h) = (grid.width(), grid.height());
    let z_in = &grid.elevation;

    z_out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let (higher, lower) = steep_counts(z_in, w, h, x, y, cfg);
            let net = match cfg.thermal_mode {
                ThermalMode::Flag => i64::from(higher > 0) - i64::from(lower > 0),
                ThermalMode::Pairwise => i64::from(higher) - i64::from(lower),
            };
            let z = z_in[y * w + x];
            *out = if net == 0 { z } else { z + cfg.amplitude * net as f64 };
        }
    });
}

/// One thermal step, returning a new grid.
pub fn thermal_step(grid: &HeightGrid, cfg: &ErosionConfig) -> HeightGrid {
    let mut next = grid.clone();
    thermal_step_into(grid, &mut next.elevation, cfg);
    next
}

/// Applies `cfg.erosion_iterations` steps in place, ping-ponging with one scratch buffer.
pub fn run_thermal(grid: &mut HeightGrid, cfg: &ErosionConfig) {
    if cfg.erosion_iterations == 0 {
        return;
    }
    let mut scratch = vec![0.0f64; grid.len()];
    for _ in 0..cfg.erosion_iterations {
        thermal_step_into(grid, &mut scratch, cfg);
        std::mem::swap(&mut grid.elevation, &mut scratch);
    }
    log::debug!(
        "thermal erosion: {} steps on {}x{} ({:?})",
        cfg.erosion_iterations,
        grid.width(),
        grid.height(),
        cfg.thermal_mode
    );
}
