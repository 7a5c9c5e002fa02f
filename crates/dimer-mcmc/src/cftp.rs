use std::collections::VecDeque;
use std::sync::Arc;

use dimer_core::{checkpoint, ErrorInfo, Monitor, ProgressEvent, RngHandle, TilingError};
use dimer_flow::initialize;
use dimer_graph::{DimerConfiguration, RegionGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::determinism::{epoch_seed, sample_seed};
use crate::dynamics::DynamicsEngine;
use crate::parallel::coupled_batch_step;
use crate::weights::FaceWeights;

/// Lifecycle of a coupling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CftpState {
    /// No randomness stored yet.
    Idle,
    /// A replay is in progress.
    EpochRunning,
    /// The last replay coalesced.
    Coalesced,
    /// The last replay did not coalesce; the next epoch doubles the window.
    DoublingEpoch,
}

/// One stored block of shared randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochBlock {
    /// Seed of the block's random stream.
    pub seed: u64,
    /// Number of coupled steps in the block.
    pub length: u64,
}

/// Outcome of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochReport {
    /// One-based epoch counter for the current sample.
    pub epoch: usize,
    /// Total replayed steps.
    pub window: u64,
    /// Cells where the lower and upper chains disagree.
    pub gap: usize,
}

impl EpochReport {
    /// Whether the chains met.
    pub fn coalesced(&self) -> bool {
        self.gap == 0
    }
}

/// An exact sample together with the effort it took.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactSample {
    /// The coalesced configuration.
    pub configuration: DimerConfiguration,
    /// Epochs used.
    pub epochs: usize,
    /// Final window length.
    pub window: u64,
}

/// How coupled steps are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coupling {
    /// One uniformly chosen face per step.
    Serial,
    /// One uniformly chosen batch of cell-disjoint faces per step, evaluated with rayon.
    Parallel,
}

/// Settings of a [`CftpCoupler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CftpOptions {
    /// Master seed; sample `i` uses the substream `i` of it.
    pub master_seed: u64,
    /// Epochs allowed per [`CftpCoupler::run_until_exact`] call.
    pub max_epochs: usize,
    /// First block length, `0` for one step per face.
    pub initial_block: u64,
    /// Step scheduling.
    pub coupling: Coupling,
    /// Worker threads for parallel coupling, `0` for the rayon default.
    pub threads: usize,
}

impl Default for CftpOptions {
    fn default() -> Self {
        Self {
            master_seed: 0,
            max_epochs: 24,
            initial_block: 0,
            coupling: Coupling::Serial,
            threads: 0,
        }
    }
}

/// Coupling from the past with backward doubling.
///
/// Blocks are kept newest-first: a new epoch prepends a block that lies further
/// in the past, and a replay runs the deque front to back from the two extremal
/// configurations. Only `(seed, length)` pairs are stored.
#[derive(Debug)]
pub struct CftpCoupler {
    graph: Arc<RegionGraph>,
    weights: Arc<FaceWeights>,
    options: CftpOptions,
    minimum: DimerConfiguration,
    maximum: DimerConfiguration,
    lower: DimerConfiguration,
    upper: DimerConfiguration,
    blocks: VecDeque<EpochBlock>,
    window: u64,
    state: CftpState,
    sample_index: u64,
    pool: Option<rayon::ThreadPool>,
}

impl CftpCoupler {
    /// Prepares a coupling within the winding sector of `seed`.
    pub fn new(
        graph: Arc<RegionGraph>,
        weights: Arc<FaceWeights>,
        seed: &DimerConfiguration,
        options: CftpOptions,
    ) -> Result<Self, TilingError> {
        seed.validate(&graph)?;
        let engine = DynamicsEngine::new(&graph, &weights);
        let mut minimum = seed.clone();
        engine.descend(&mut minimum);
        let mut maximum = seed.clone();
        engine.ascend(&mut maximum);
        let pool = match (options.coupling, options.threads) {
            (Coupling::Parallel, threads) if threads > 0 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|err| {
                        TilingError::InvalidInput(
                            ErrorInfo::new("thread_pool", err.to_string())
                                .with_context("threads", threads),
                        )
                    })?,
            ),
            _ => None,
        };
        debug!(
            faces = graph.faces().len(),
            extremal_gap = minimum.gap(&maximum),
            "cftp coupler prepared"
        );
        Ok(Self {
            lower: minimum.clone(),
            upper: maximum.clone(),
            graph,
            weights,
            options,
            minimum,
            maximum,
            blocks: VecDeque::new(),
            window: 0,
            state: CftpState::Idle,
            sample_index: 0,
            pool,
        })
    }

    /// Builds the region's max-flow matching and prepares a coupling from it.
    ///
    /// Regions without a perfect matching fail with `InfeasibleRegion` before
    /// any flip is attempted.
    pub fn for_region(
        graph: Arc<RegionGraph>,
        weights: Arc<FaceWeights>,
        options: CftpOptions,
        monitor: &dyn Monitor,
    ) -> Result<Self, TilingError> {
        let seed = initialize(&graph, monitor)?;
        Self::new(graph, weights, &seed, options)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CftpState {
        self.state
    }

    /// Stored blocks, earliest in time first.
    pub fn blocks(&self) -> &VecDeque<EpochBlock> {
        &self.blocks
    }

    /// Total replayed steps of the current attempt.
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Epochs run for the current sample.
    pub fn epochs(&self) -> usize {
        self.blocks.len()
    }

    /// Cells where the current chains disagree.
    pub fn gap(&self) -> usize {
        self.lower.gap(&self.upper)
    }

    /// Lower chain after the last replay.
    pub fn lower(&self) -> &DimerConfiguration {
        &self.lower
    }

    /// Upper chain after the last replay.
    pub fn upper(&self) -> &DimerConfiguration {
        &self.upper
    }

    /// Minimum of the sector.
    pub fn minimum(&self) -> &DimerConfiguration {
        &self.minimum
    }

    /// Maximum of the sector.
    pub fn maximum(&self) -> &DimerConfiguration {
        &self.maximum
    }

    /// Number of exact samples already returned.
    pub fn samples_taken(&self) -> u64 {
        self.sample_index
    }

    /// Prepends one block and replays the whole window from the extremal states.
    pub fn run_epoch(&mut self) -> EpochReport {
        let epoch_index = self.blocks.len();
        let length = if epoch_index == 0 {
            match self.options.initial_block {
                0 => self.graph.faces().len().max(1) as u64,
                length => length,
            }
        } else {
            self.window
        };
        let seed = epoch_seed(
            sample_seed(self.options.master_seed, self.sample_index),
            epoch_index,
        );
        self.blocks.push_front(EpochBlock { seed, length });
        self.window += length;
        self.state = CftpState::EpochRunning;

        self.lower.clone_from(&self.minimum);
        self.upper.clone_from(&self.maximum);
        match (&self.pool, self.options.coupling) {
            (Some(pool), Coupling::Parallel) => pool.install(|| {
                replay(
                    &self.graph,
                    &self.weights,
                    &self.blocks,
                    Coupling::Parallel,
                    &mut self.lower,
                    &mut self.upper,
                )
            }),
            (_, coupling) => replay(
                &self.graph,
                &self.weights,
                &self.blocks,
                coupling,
                &mut self.lower,
                &mut self.upper,
            ),
        }

        let report = EpochReport {
            epoch: self.blocks.len(),
            window: self.window,
            gap: self.lower.gap(&self.upper),
        };
        self.state = if report.coalesced() {
            CftpState::Coalesced
        } else {
            CftpState::DoublingEpoch
        };
        debug!(
            epoch = report.epoch,
            window = report.window,
            gap = report.gap,
            "cftp epoch replayed"
        );
        report
    }

    /// Runs epochs until the chains coalesce or the per-call budget is spent.
    ///
    /// A spent budget keeps the stored blocks, so calling again continues the
    /// same attempt. After a success the coupler moves on to a fresh random
    /// stream for the next sample.
    pub fn run_until_exact(&mut self, monitor: &dyn Monitor) -> Result<ExactSample, TilingError> {
        for _ in 0..self.options.max_epochs {
            let report = self.run_epoch();
            if report.coalesced() {
                let sample = ExactSample {
                    configuration: self.lower.clone(),
                    epochs: report.epoch,
                    window: report.window,
                };
                info!(
                    epochs = sample.epochs,
                    window = sample.window,
                    sample = self.sample_index,
                    "cftp coalesced"
                );
                self.sample_index += 1;
                self.blocks.clear();
                self.window = 0;
                return Ok(sample);
            }
            checkpoint(
                monitor,
                "cftp",
                ProgressEvent::Epoch {
                    epoch: report.epoch,
                    window: report.window,
                    gap: report.gap,
                },
            )?;
        }
        let gap = self.gap();
        warn!(
            epochs = self.epochs(),
            window = self.window,
            gap,
            "cftp epoch budget exhausted"
        );
        Err(TilingError::EpochBudgetExceeded(
            ErrorInfo::new("epoch-budget", "chains did not coalesce within the epoch budget")
                .with_context("epochs", self.epochs())
                .with_context("window", self.window)
                .with_context("gap", gap)
                .with_hint("call again to continue doubling, or raise cftp.max_epochs"),
        ))
    }

    /// Draws `count` exact samples at once, one rayon task per sample.
    ///
    /// Sample `i` uses the random stream of the `i`-th following
    /// [`CftpCoupler::run_until_exact`] call, so the batch matches that many
    /// sequential calls. On error no sample index is consumed.
    pub fn sample_batch(
        &mut self,
        count: usize,
        monitor: &dyn Monitor,
    ) -> Result<Vec<ExactSample>, TilingError> {
        let base = self.sample_index;
        let draw = |offset: usize| self.fork(base + offset as u64).run_until_exact(monitor);
        let results: Vec<Result<ExactSample, TilingError>> = match &self.pool {
            Some(pool) => pool.install(|| (0..count).into_par_iter().map(draw).collect()),
            None => (0..count).into_par_iter().map(draw).collect(),
        };
        let samples = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        self.sample_index += count as u64;
        self.reset();
        info!(samples = count, first = base, "cftp batch drawn");
        Ok(samples)
    }

    fn fork(&self, sample_index: u64) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            weights: Arc::clone(&self.weights),
            options: self.options,
            minimum: self.minimum.clone(),
            maximum: self.maximum.clone(),
            lower: self.minimum.clone(),
            upper: self.maximum.clone(),
            blocks: VecDeque::new(),
            window: 0,
            state: CftpState::Idle,
            sample_index,
            pool: None,
        }
    }

    /// Drops stored randomness; the next epoch starts a new attempt for the same sample.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.window = 0;
        self.state = CftpState::Idle;
        self.lower.clone_from(&self.minimum);
        self.upper.clone_from(&self.maximum);
    }
}

fn replay(
    graph: &RegionGraph,
    weights: &FaceWeights,
    blocks: &VecDeque<EpochBlock>,
    coupling: Coupling,
    lower: &mut DimerConfiguration,
    upper: &mut DimerConfiguration,
) {
    let engine = DynamicsEngine::new(graph, weights);
    let faces = graph.faces().len();
    let mut thresholds = Vec::new();
    for block in blocks {
        let mut rng = RngHandle::from_seed(block.seed);
        for _ in 0..block.length {
            match coupling {
                Coupling::Serial => {
                    if faces == 0 {
                        continue;
                    }
                    let face = rng.index(faces);
                    let u = rng.uniform();
                    engine.apply(lower, face, u);
                    engine.apply(upper, face, u);
                }
                Coupling::Parallel => {
                    coupled_batch_step(graph, weights, lower, upper, &mut rng, &mut thresholds)
                }
            }
        }
    }
}
