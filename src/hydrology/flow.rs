//! Steepest-descent flow routing.

use crate::geometry::neighbors::{is_border, neighbors_clamped};
use crate::geometry::Connectivity;
use crate::terrain::HeightGrid;

/// Successor value for a cell with no strictly lower neighbour.
pub const SINK: usize = usize::MAX;

/// Downstream successor per cell, or [`SINK`].
///
/// Every recorded successor is strictly lower than its cell, so the graph is a
/// forest rooted at the sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowGraph {
    width: usize,
    height: usize,
    successors: Vec<usize>,
}

impl FlowGraph {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Raw successor array with [`SINK`] sentinels.
    pub fn successors(&self) -> &[usize] {
        &self.successors
    }

    /// Downstream cell of `i`, or `None` for a sink.
    pub fn successor(&self, i: usize) -> Option<usize> {
        match self.successors[i] {
            SINK => None,
            s => Some(s),
        }
    }

    pub fn is_sink(&self, i: usize) -> bool {
        self.successors[i] == SINK
    }

    /// True for every sink.
    pub fn sink_mask(&self) -> Vec<bool> {
        self.successors.iter().map(|&s| s == SINK).collect()
    }

    /// Indices of all sinks, ascending.
    pub fn sinks(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_sink(i)).collect()
    }

    /// Makes every border cell a sink, so flow leaves the map at the edges.
    pub fn mark_border_sinks(&mut self) {
        let (w, h) = (self.width, self.height);
        for (i, s) in self.successors.iter_mut().enumerate() {
            if is_border(w, h, i % w, i / w) {
                *s = SINK;
            }
        }
    }

    /// Cells visited downstream of `i`, ending at its sink. Excludes `i` itself.
    pub fn downstream(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.successor(i), move |&c| self.successor(c))
    }

    /// The sink that `i` eventually drains into (`i` itself for a sink).
    pub fn terminal_sink(&self, i: usize) -> usize {
        self.downstream(i).last().unwrap_or(i)
    }

    /// Labels each cell with the sink it drains into.
    pub fn catchments(&self) -> Vec<usize> {
        let n = self.len();
        let mut label = vec![SINK; n];
        let mut path = Vec::new();

        for start in 0..n {
            let mut c = start;
            while label[c] == SINK {
                match self.successor(c) {
                    Some(next) => {
                        path.push(c);
                        c = next;
                    }
                    None => {
                        label[c] = c;
                    }
                }
            }
            let root = label[c];
            for p in path.drain(..) {
                label[p] = root;
            }
        }

        label
    }
}

/// Routes each cell to the neighbour with the largest drop per distance.
///
/// Distance is 1 for cardinal and sqrt(2) for diagonal neighbours. Only strictly
/// lower neighbours qualify; ties go to the first direction in N, NE, E, SE, S,
/// SW, W, NW order. Edges are clamped.
pub fn route_flow(width: usize, height: usize, elevation: &[f64], connectivity: Connectivity) -> FlowGraph {
    assert_eq!(elevation.len(), width * height);

    let successors = (0..elevation.len())
        .map(|i| {
            let (x, y) = (i % width, i / width);
            let z0 = elevation[i];
            let mut best = SINK;
            let mut best_slope = 0.0f64;

            for (dir, n) in neighbors_clamped(width, height, x, y, connectivity) {
                let drop = z0 - elevation[n];
                if drop > 0.0 {
                    let slope = drop / dir.distance();
                    if slope > best_slope {
                        best_slope = slope;
                        best = n;
                    }
                }
            }
            best
        })
        .collect();

    FlowGraph {
        width,
        height,
        successors,
    }
}

/// Routes flow over a grid's own elevations.
pub fn route_grid(grid: &HeightGrid, connectivity: Connectivity) -> FlowGraph {
    route_flow(grid.width(), grid.height(), &grid.elevation, connectivity)
}
