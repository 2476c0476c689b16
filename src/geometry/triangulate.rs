//! Delaunay triangulation of grid sample points.
//!
//! `delaunator` does the work; its types stay inside this module. Callers see
//! `glam` points and a flat index list.

use glam::DVec2;

use crate::error::{Result, TerrainError};

/// Triangles with twice the area below this are treated as degenerate.
const DEGENERATE_AREA2: f64 = 1e-12;

/// Points plus a flat list of index triples.
///
/// Triples are clockwise in the grid plane (x right, y down), so under the
/// OBJ mapping `(x, up, y)` every face normal points up.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    /// Sample points in input order, so cell index == point index for grids.
    pub points: Vec<DVec2>,
    /// Triangle corner indices; length is a multiple of three.
    pub triangles: Vec<usize>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Iterates over triangles as index triples.
    pub fn iter_triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Sum of triangle areas.
    pub fn total_area(&self) -> f64 {
        self.iter_triangles()
            .map(|[a, b, c]| 0.5 * signed_area2(self.points[a], self.points[b], self.points[c]).abs())
            .sum()
    }
}

/// Twice the signed area of `abc`; positive when `abc` turns from +x towards +y.
#[inline]
fn signed_area2(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Triangulates one point per cell of a `width x height` grid at `(x, y)`.
pub fn triangulate_grid(width: usize, height: usize) -> Result<Triangulation> {
    let points: Vec<DVec2> = (0..height)
        .flat_map(|y| (0..width).map(move |x| DVec2::new(x as f64, y as f64)))
        .collect();
    triangulate_points(points)
}

/// Triangulates arbitrary 2D points.
///
/// Degenerate triangles are dropped and winding is made consistent. Fails if
/// no triangle survives or some point is left out of every triangle.
pub fn triangulate_points(points: Vec<DVec2>) -> Result<Triangulation> {
    if points.len() < 3 {
        return Err(TerrainError::Triangulation(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }

    let input: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();
    let raw = delaunator::triangulate(&input);

    let mut triangles = Vec::with_capacity(raw.triangles.len());
    for t in raw.triangles.chunks_exact(3) {
        let (a, b, c) = (t[0], t[1], t[2]);
        let area2 = signed_area2(points[a], points[b], points[c]);
        if area2.abs() <= DEGENERATE_AREA2 {
            continue;
        }
        if area2 > 0.0 {
            triangles.extend_from_slice(&[a, c, b]);
        } else {
            triangles.extend_from_slice(&[a, b, c]);
        }
    }

    if triangles.is_empty() {
        return Err(TerrainError::Triangulation("all points are colinear".to_string()));
    }

    let mut used = vec![false; points.len()];
    for &i in &triangles {
        used[i] = true;
    }
    if let Some(missing) = used.iter().position(|&u| !u) {
        return Err(TerrainError::Triangulation(format!(
            "point {} is not a vertex of any triangle",
            missing
        )));
    }

    log::trace!("triangulated {} points into {} triangles", points.len(), triangles.len() / 3);
    Ok(Triangulation { points, triangles })
}
