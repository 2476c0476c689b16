//! Flux accumulation over a flow graph.

use super::flow::FlowGraph;

/// Cell indices sorted by descending elevation, ties by ascending index.
///
/// Every cell precedes its successor in this order, because successors are
/// strictly lower.
pub fn descending_order(elevation: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..elevation.len()).collect();
    // Stable sort keeps index order among equal heights.
    order.sort_by(|&a, &b| elevation[b].total_cmp(&elevation[a]));
    order
}

/// Accumulates `base(c)` plus everything upstream of `c`, for every cell.
///
/// `elevation` must be the surface `graph` was routed on. Flux that reaches a
/// sink stays there.
pub fn accumulate_flux<F>(elevation: &[f64], graph: &FlowGraph, base: F) -> Vec<f64>
where
    F: Fn(usize) -> f64,
{
    assert_eq!(elevation.len(), graph.len());

    let mut flux: Vec<f64> = (0..graph.len()).map(&base).collect();
    for i in descending_order(elevation) {
        if let Some(down) = graph.successor(i) {
            flux[down] += flux[i];
        }
    }
    flux
}

/// Flux with the same contribution from every cell.
pub fn accumulate_uniform(elevation: &[f64], graph: &FlowGraph, rainfall: f64) -> Vec<f64> {
    accumulate_flux(elevation, graph, |_| rainfall)
}

/// True where flux reaches `threshold`.
pub fn river_mask(flux: &[f64], threshold: f64) -> Vec<bool> {
    flux.iter().map(|&f| f >= threshold).collect()
}
