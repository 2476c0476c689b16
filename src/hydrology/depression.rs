//! Priority-Flood depression filling (Barnes et al. 2014), with an optional epsilon
//! gradient so filled flats keep draining towards their outlet.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::neighbors::{is_border, neighbors_clamped};
use crate::geometry::Connectivity;
use super::OutletModel;

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    height: f64,
    idx: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Min-heap by height, then by index, via reversed ordering.
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .height
            .total_cmp(&self.height)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Returns filled heights (same length as input).
///
/// With `epsilon > 0` every non-outlet cell ends up strictly above the
/// neighbour it was flooded from, so steepest-descent routing reaches an outlet
/// from everywhere. With `epsilon == 0` depressions fill to their spill height
/// and stay flat.
pub fn priority_flood_fill(
    width: usize,
    height: usize,
    heights: &[f64],
    outlet: OutletModel,
    epsilon: f64,
    connectivity: Connectivity,
) -> Vec<f64> {
    let total = width * height;
    assert_eq!(heights.len(), total);

    let mut filled = heights.to_vec();
    let mut visited = vec![false; total];
    let mut heap = BinaryHeap::<HeapItem>::new();

    let is_outlet = |idx: usize| match outlet {
        OutletModel::Border => is_border(width, height, idx % width, idx / width),
        OutletModel::SeaLevel(sea_level) => heights[idx] <= sea_level,
    };

    for idx in (0..total).filter(|&i| is_outlet(i)) {
        visited[idx] = true;
        heap.push(HeapItem { height: heights[idx], idx });
    }

    // If nothing qualifies as an outlet, fall back to seeding the global minimum.
    if heap.is_empty() && total > 0 {
        let min_i = (0..total)
            .min_by(|&a, &b| heights[a].total_cmp(&heights[b]))
            .unwrap_or(0);
        visited[min_i] = true;
        heap.push(HeapItem { height: heights[min_i], idx: min_i });
    }

    while let Some(HeapItem { height: h_cur, idx }) = heap.pop() {
        let (x, y) = (idx % width, idx / width);
        for (_, n_idx) in neighbors_clamped(width, height, x, y, connectivity) {
            if visited[n_idx] {
                continue;
            }
            visited[n_idx] = true;

            let floor = if epsilon > 0.0 { h_cur + epsilon } else { h_cur };
            let new_h = filled[n_idx].max(floor);
            filled[n_idx] = new_h;
            heap.push(HeapItem { height: new_h, idx: n_idx });
        }
    }

    log::trace!(
        "priority flood raised {} of {} cells",
        filled.iter().zip(heights).filter(|(f, h)| f > h).count(),
        total
    );
    filled
}
