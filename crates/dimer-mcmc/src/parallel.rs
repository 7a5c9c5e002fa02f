//! Batched coupling step: one random batch of cell-disjoint faces per step.

use dimer_core::RngHandle;
use dimer_graph::{DimerConfiguration, FaceId, FaceState, RegionGraph};
use rayon::prelude::*;

use crate::dynamics::heat_bath_target;
use crate::weights::FaceWeights;

/// Advances both chains by one batched step drawn from `rng`.
///
/// The batch index and every threshold are drawn sequentially, so the step
/// is reproducible regardless of how many worker threads evaluate it.
pub(crate) fn coupled_batch_step(
    graph: &RegionGraph,
    weights: &FaceWeights,
    lower: &mut DimerConfiguration,
    upper: &mut DimerConfiguration,
    rng: &mut RngHandle,
    thresholds: &mut Vec<f64>,
) {
    let batches = graph.batches();
    if batches.is_empty() {
        return;
    }
    let batch = &batches[rng.index(batches.len())];
    thresholds.clear();
    thresholds.extend(batch.iter().map(|_| rng.uniform()));
    let thresholds = thresholds.as_slice();
    rayon::join(
        || apply_batch(graph, weights, lower, batch, thresholds),
        || apply_batch(graph, weights, upper, batch, thresholds),
    );
}

fn apply_batch(
    graph: &RegionGraph,
    weights: &FaceWeights,
    config: &mut DimerConfiguration,
    batch: &[FaceId],
    thresholds: &[f64],
) {
    let view: &DimerConfiguration = config;
    let targets: Vec<Option<FaceState>> = batch
        .par_iter()
        .zip(thresholds.par_iter())
        .map(|(&face, &u)| heat_bath_target(view, graph.face(face), weights.p_down(face), u).1)
        .collect();
    for (&face, target) in batch.iter().zip(targets) {
        if let Some(state) = target {
            config.set_face(graph.face(face), state);
        }
    }
}
