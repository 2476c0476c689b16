//! Grid geometry.
//!
//! Neighbour enumeration (clamped and toroidal) and Delaunay triangulation of
//! the grid's sample points.

pub mod neighbors;
mod triangulate;

pub use neighbors::{Connectivity, Direction};
pub use triangulate::{triangulate_grid, triangulate_points, Triangulation};
