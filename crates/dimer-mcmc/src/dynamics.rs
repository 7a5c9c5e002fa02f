use dimer_core::RngHandle;
use dimer_graph::{DimerConfiguration, Face, FaceId, FaceState, RegionGraph};

use crate::metrics::FlipStats;
use crate::weights::FaceWeights;

/// Result of one heat-bath update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipOutcome {
    /// Orientation found before the update.
    pub before: FaceState,
    /// Whether the face changed orientation.
    pub flipped: bool,
}

impl FlipOutcome {
    const FROZEN: FlipOutcome = FlipOutcome {
        before: FaceState::Frozen,
        flipped: false,
    };
}

/// Target orientation chosen by the threshold `u`, if it differs from the current one.
///
/// `u < p_down` asks for the face to be down, anything else asks for up. The
/// same `u` therefore pushes every chain in the same direction, which keeps the
/// height order between coupled chains.
pub fn heat_bath_target(
    config: &DimerConfiguration,
    face: &Face,
    p_down: f64,
    u: f64,
) -> (FaceState, Option<FaceState>) {
    let before = config.face_state(face);
    let target = match before {
        FaceState::Up if u < p_down => Some(FaceState::Down),
        FaceState::Down if u >= p_down => Some(FaceState::Up),
        _ => None,
    };
    (before, target)
}

/// Applies the heat-bath rule to one face in place.
pub fn heat_bath(config: &mut DimerConfiguration, face: &Face, p_down: f64, u: f64) -> FlipOutcome {
    let (before, target) = heat_bath_target(config, face, p_down, u);
    if let Some(state) = target {
        config.set_face(face, state);
    }
    FlipOutcome {
        before,
        flipped: target.is_some(),
    }
}

/// Glauber dynamics of face flips over a fixed region.
#[derive(Debug, Clone, Copy)]
pub struct DynamicsEngine<'a> {
    graph: &'a RegionGraph,
    weights: &'a FaceWeights,
}

impl<'a> DynamicsEngine<'a> {
    /// Binds the engine to a region and its face weights.
    pub fn new(graph: &'a RegionGraph, weights: &'a FaceWeights) -> Self {
        Self { graph, weights }
    }

    /// Heat-bath update of `face` with threshold `u`.
    pub fn apply(&self, config: &mut DimerConfiguration, face: FaceId, u: f64) -> FlipOutcome {
        heat_bath(config, self.graph.face(face), self.weights.p_down(face), u)
    }

    /// One elementary move on a uniformly chosen face.
    ///
    /// Regions without faces consume the step without drawing randomness.
    pub fn step(
        &self,
        config: &mut DimerConfiguration,
        rng: &mut RngHandle,
        stats: &mut FlipStats,
    ) -> FlipOutcome {
        let faces = self.graph.faces().len();
        let outcome = if faces == 0 {
            FlipOutcome::FROZEN
        } else {
            let face = rng.index(faces);
            let u = rng.uniform();
            self.apply(config, face, u)
        };
        record(stats, outcome);
        outcome
    }

    /// Runs `steps` elementary moves.
    pub fn run(
        &self,
        config: &mut DimerConfiguration,
        steps: u64,
        rng: &mut RngHandle,
        stats: &mut FlipStats,
    ) {
        for _ in 0..steps {
            self.step(config, rng, stats);
        }
    }

    /// One systematic pass over every face, batch by batch.
    ///
    /// Sweeps visit faces in a fixed order and are only used for preview
    /// dynamics; exact sampling always picks faces at random.
    pub fn sweep(&self, config: &mut DimerConfiguration, rng: &mut RngHandle, stats: &mut FlipStats) {
        for batch in self.graph.batches() {
            for &face in batch {
                let u = rng.uniform();
                let outcome = self.apply(config, face, u);
                record(stats, outcome);
            }
        }
    }

    /// Flips faces down until none is up: the minimum of the configuration's sector.
    pub fn descend(&self, config: &mut DimerConfiguration) {
        self.settle(config, FaceState::Up, FaceState::Down);
    }

    /// Flips faces up until none is down: the maximum of the configuration's sector.
    pub fn ascend(&self, config: &mut DimerConfiguration) {
        self.settle(config, FaceState::Down, FaceState::Up);
    }

    fn settle(&self, config: &mut DimerConfiguration, from: FaceState, to: FaceState) {
        loop {
            let mut changed = false;
            for face in self.graph.faces() {
                if config.face_state(face) == from {
                    config.set_face(face, to);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}

fn record(stats: &mut FlipStats, outcome: FlipOutcome) {
    stats.attempts += 1;
    match outcome.before {
        FaceState::Up => {
            stats.up_attempts += 1;
            if outcome.flipped {
                stats.flips_down += 1;
            }
        }
        FaceState::Down => {
            stats.down_attempts += 1;
            if outcome.flipped {
                stats.flips_up += 1;
            }
        }
        FaceState::Frozen => {}
    }
}
