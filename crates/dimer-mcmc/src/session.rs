use std::sync::Arc;

use dimer_core::{Cell, Dimer, ErrorInfo, Monitor, NoopMonitor, RngHandle, TilingError};
use dimer_flow::initialize;
use dimer_graph::{configuration_hash, heights, DimerConfiguration, HeightMap, RegionGraph, RegionSpec};
use tracing::info;

use crate::cftp::{CftpCoupler, CftpOptions, Coupling, ExactSample};
use crate::config::{SamplerConfig, SamplingMode};
use crate::determinism::preview_seed;
use crate::dynamics::DynamicsEngine;
use crate::fluctuations::FluctuationField;
use crate::metrics::{Diagnostics, FlipStats};
use crate::topology::{HoleStatus, RegionEdit, TopologyTracker};
use crate::weights::FaceWeights;

/// One independent sampler instance owning its region, state and randomness.
///
/// Sessions share nothing with each other; several may run side by side on
/// different threads.
#[derive(Debug)]
pub struct Session {
    config: SamplerConfig,
    graph: Arc<RegionGraph>,
    weights: Arc<FaceWeights>,
    state: DimerConfiguration,
    rng: RngHandle,
    stats: FlipStats,
    topology: TopologyTracker,
    coupler: Option<CftpCoupler>,
    exact_samples: u64,
    last_exact: Option<(usize, u64)>,
}

impl Session {
    /// Builds the region and seeds it with a max-flow matching.
    pub fn new(spec: &RegionSpec, config: SamplerConfig) -> Result<Self, TilingError> {
        Self::with_monitor(spec, config, &NoopMonitor)
    }

    /// Like [`Session::new`], reporting initializer progress to `monitor`.
    pub fn with_monitor(
        spec: &RegionSpec,
        config: SamplerConfig,
        monitor: &dyn Monitor,
    ) -> Result<Self, TilingError> {
        config.validate()?;
        let graph = RegionGraph::build(spec)?;
        let weights = FaceWeights::new(&graph, &config.bias)?;
        let state = initialize(&graph, monitor)?;
        let mut topology = TopologyTracker::new(config.winding_band, config.repair_radius);
        topology.refresh(&graph, &state);
        info!(
            cells = graph.len(),
            faces = graph.faces().len(),
            holes = graph.holes().len(),
            mode = ?config.mode,
            "session initialised"
        );
        Ok(Self {
            rng: RngHandle::from_seed(preview_seed(config.seed_policy.master_seed)),
            config,
            graph: Arc::new(graph),
            weights: Arc::new(weights),
            state,
            stats: FlipStats::default(),
            topology,
            coupler: None,
            exact_samples: 0,
            last_exact: None,
        })
    }

    /// Sampler settings.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Current region graph.
    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    /// Current configuration.
    pub fn configuration(&self) -> &DimerConfiguration {
        &self.state
    }

    /// Preview flip counters.
    pub fn stats(&self) -> &FlipStats {
        &self.stats
    }

    /// Runs `steps` random-face heat-bath updates; returns the accepted flips.
    pub fn step(&mut self, steps: u64) -> u64 {
        let before = self.stats.accepted();
        DynamicsEngine::new(&self.graph, &self.weights).run(
            &mut self.state,
            steps,
            &mut self.rng,
            &mut self.stats,
        );
        self.stats.accepted() - before
    }

    /// One systematic pass over all faces; returns the accepted flips.
    pub fn sweep(&mut self) -> u64 {
        let before = self.stats.accepted();
        DynamicsEngine::new(&self.graph, &self.weights).sweep(
            &mut self.state,
            &mut self.rng,
            &mut self.stats,
        );
        self.stats.accepted() - before
    }

    /// Draws an exact sample by coupling from the past and adopts it.
    ///
    /// The sample is drawn within the winding sector of the current
    /// configuration. Preview sessions reject the call.
    pub fn run_until_exact(&mut self, monitor: &dyn Monitor) -> Result<ExactSample, TilingError> {
        let sample = self.exact_coupler()?.run_until_exact(monitor)?;
        self.state.clone_from(&sample.configuration);
        self.exact_samples += 1;
        self.last_exact = Some((sample.epochs, sample.window));
        Ok(sample)
    }

    /// Draws `count` independent exact samples in parallel and returns their
    /// height fluctuation field. The current configuration is left as it is.
    pub fn fluctuations(
        &mut self,
        count: usize,
        monitor: &dyn Monitor,
    ) -> Result<FluctuationField, TilingError> {
        if count < 2 {
            return Err(TilingError::InvalidInput(
                ErrorInfo::new("too-few-samples", "fluctuations need at least two samples")
                    .with_context("samples", count),
            ));
        }
        let samples = self.exact_coupler()?.sample_batch(count, monitor)?;
        self.exact_samples += count as u64;
        if let Some(last) = samples.last() {
            self.last_exact = Some((last.epochs, last.window));
        }
        let configurations: Vec<DimerConfiguration> =
            samples.into_iter().map(|sample| sample.configuration).collect();
        FluctuationField::from_samples(&self.graph, &configurations)
    }

    fn exact_coupler(&mut self) -> Result<&mut CftpCoupler, TilingError> {
        let coupling = match self.config.mode {
            SamplingMode::Preview => {
                return Err(TilingError::InvalidInput(
                    ErrorInfo::new("mode-preview", "exact sampling is disabled in preview mode")
                        .with_hint("set mode to cftp-serial or cftp-parallel"),
                ))
            }
            SamplingMode::CftpSerial => Coupling::Serial,
            SamplingMode::CftpParallel => Coupling::Parallel,
        };
        let coupler = match self.coupler.take() {
            Some(coupler) => coupler,
            None => CftpCoupler::new(
                Arc::clone(&self.graph),
                Arc::clone(&self.weights),
                &self.state,
                CftpOptions {
                    master_seed: self.config.seed_policy.master_seed,
                    max_epochs: self.config.cftp.max_epochs,
                    initial_block: self.config.cftp.initial_block,
                    coupling,
                    threads: self.config.cftp.threads,
                },
            )?,
        };
        Ok(self.coupler.insert(coupler))
    }

    /// Preview mode runs `preview_steps` updates; exact modes draw one exact sample.
    pub fn sample(&mut self, monitor: &dyn Monitor) -> Result<&DimerConfiguration, TilingError> {
        match self.config.mode {
            SamplingMode::Preview => {
                self.step(self.config.preview_steps);
            }
            SamplingMode::CftpSerial | SamplingMode::CftpParallel => {
                self.run_until_exact(monitor)?;
            }
        }
        Ok(&self.state)
    }

    /// Current dimers in lattice coordinates.
    pub fn export_configuration(&self) -> Vec<Dimer> {
        self.state.dimers(&self.graph)
    }

    /// Replaces the configuration with an imported dimer list.
    pub fn set_configuration(&mut self, dimers: &[Dimer]) -> Result<(), TilingError> {
        let config = DimerConfiguration::from_dimers(&self.graph, dimers)?;
        self.state = config;
        self.topology.refresh(&self.graph, &self.state);
        self.coupler = None;
        Ok(())
    }

    /// Height function of the current configuration.
    pub fn heights(&self) -> HeightMap {
        heights(&self.graph, &self.state)
    }

    /// Hex digest of the current configuration.
    pub fn configuration_hash(&self) -> String {
        configuration_hash(&self.graph, &self.state)
    }

    /// Changes the winding of `hole` by `delta`; returns the cells whose partner changed.
    pub fn adjust_hole_winding(&mut self, hole: usize, delta: i32) -> Result<Vec<Cell>, TilingError> {
        let changed = self
            .topology
            .adjust_hole_winding(&self.graph, &mut self.state, hole, delta)?;
        if !changed.is_empty() {
            self.coupler = None;
        }
        Ok(changed)
    }

    /// Edits the region and repairs the configuration locally; returns the changed cells.
    pub fn repair_region(&mut self, edits: &[RegionEdit]) -> Result<Vec<Cell>, TilingError> {
        let outcome = self.topology.repair_region(&self.graph, &self.state, edits)?;
        let weights = FaceWeights::new(&outcome.graph, &self.config.bias)?;
        self.graph = Arc::new(outcome.graph);
        self.weights = Arc::new(weights);
        self.state = outcome.configuration;
        self.topology.refresh(&self.graph, &self.state);
        self.coupler = None;
        Ok(outcome.changed)
    }

    /// Per-hole winding report.
    pub fn holes(&self) -> Vec<HoleStatus> {
        self.topology.status(&self.graph, &self.state)
    }

    /// Counter snapshot.
    pub fn diagnostics(&self) -> Diagnostics {
        let (epochs, window, gap) = match &self.coupler {
            Some(coupler) if coupler.epochs() > 0 => (coupler.epochs(), coupler.window(), coupler.gap()),
            _ => {
                let (epochs, window) = self.last_exact.unwrap_or((0, 0));
                (epochs, window, 0)
            }
        };
        Diagnostics {
            flip_attempts: self.stats.attempts,
            flips_accepted: self.stats.accepted(),
            acceptance_rate: self.stats.acceptance_rate(),
            epochs,
            window,
            gap,
            exact_samples: self.exact_samples,
            windings: self.topology.windings().to_vec(),
        }
    }
}
