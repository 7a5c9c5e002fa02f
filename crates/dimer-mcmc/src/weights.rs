use dimer_core::TilingError;
use dimer_graph::{FaceId, RegionGraph};

use crate::config::BiasConfig;

/// Per-face heat-bath probabilities derived from a [`BiasConfig`].
///
/// The up orientation of a face carries weight `q` and the down orientation
/// weight `1`, so a flippable face is put down with probability `1 / (1 + q)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceWeights {
    p_down: Vec<f64>,
}

impl FaceWeights {
    /// Evaluates `bias` at every face centre of `graph`.
    pub fn new(graph: &RegionGraph, bias: &BiasConfig) -> Result<Self, TilingError> {
        bias.validate()?;
        let p_down = graph
            .faces()
            .iter()
            .map(|face| 1.0 / (1.0 + bias.q_at(face.center)))
            .collect();
        Ok(Self { p_down })
    }

    /// Uniform weights for `graph`.
    pub fn uniform(graph: &RegionGraph) -> Self {
        Self {
            p_down: vec![0.5; graph.faces().len()],
        }
    }

    /// Probability that a heat-bath update leaves `face` down.
    pub fn p_down(&self, face: FaceId) -> f64 {
        self.p_down[face]
    }

    /// `(w_up, w_down)` normalised so `w_down == 1`.
    pub fn weights(&self, face: FaceId) -> (f64, f64) {
        let p = self.p_down[face];
        ((1.0 - p) / p, 1.0)
    }

    /// Number of faces covered.
    pub fn len(&self) -> usize {
        self.p_down.len()
    }

    /// Whether the region has no faces.
    pub fn is_empty(&self) -> bool {
        self.p_down.is_empty()
    }
}
