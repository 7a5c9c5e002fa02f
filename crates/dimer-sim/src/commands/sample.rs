use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use dimer_core::{Cell, Dimer, NoopMonitor};
use dimer_graph::{canonical_hash, double_dimer_loops, loop_size_counts, DimerConfiguration};
use dimer_mcmc::{
    Diagnostics, FluctuationField, HoleStatus, RegionEdit, SamplerConfig, SamplingMode, Session,
};
use serde::Serialize;
use tracing::info;

use super::{emit_json, read_json, read_region};

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// JSON region descriptor.
    #[arg(long)]
    pub region: PathBuf,
    /// YAML sampler configuration; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Overrides the configured master seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Overrides the configured sampling mode.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Number of samples to draw.
    #[arg(long, default_value_t = 1)]
    pub samples: usize,
    /// JSON list of region edits applied before sampling.
    #[arg(long)]
    pub edits: Option<PathBuf>,
    /// Winding change `HOLE:DELTA` applied before sampling; repeatable.
    #[arg(long = "wind", value_parser = parse_winding)]
    pub windings: Vec<(usize, i32)>,
    /// Include the height function of every sample.
    #[arg(long)]
    pub heights: bool,
    /// Overlay the first two samples and list double-dimer loops of at least this size.
    #[arg(long, value_name = "MIN_SIZE")]
    pub loops: Option<usize>,
    /// Draw this many extra exact samples and report their height fluctuations.
    #[arg(long, value_name = "COUNT")]
    pub fluctuations: Option<usize>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Preview,
    CftpSerial,
    CftpParallel,
}

impl From<ModeArg> for SamplingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Preview => SamplingMode::Preview,
            ModeArg::CftpSerial => SamplingMode::CftpSerial,
            ModeArg::CftpParallel => SamplingMode::CftpParallel,
        }
    }
}

fn parse_winding(raw: &str) -> Result<(usize, i32), String> {
    let (hole, delta) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected HOLE:DELTA, got `{raw}`"))?;
    let hole = hole.parse().map_err(|err| format!("bad hole index `{hole}`: {err}"))?;
    let delta = delta.parse().map_err(|err| format!("bad winding delta `{delta}`: {err}"))?;
    Ok((hole, delta))
}

#[derive(Debug, Serialize)]
struct SampleReport {
    region_hash: String,
    mode: SamplingMode,
    master_seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    samples: Vec<SampleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loops: Option<LoopReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fluctuations: Option<FluctuationField>,
    holes: Vec<HoleStatus>,
    diagnostics: Diagnostics,
}

#[derive(Debug, Serialize)]
struct LoopReport {
    min_size: usize,
    size_counts: BTreeMap<usize, usize>,
    loops: Vec<Vec<Cell>>,
}

#[derive(Debug, Serialize)]
struct SampleRecord {
    index: usize,
    hash: String,
    dimers: Vec<Dimer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heights: Option<Vec<HeightEntry>>,
}

#[derive(Debug, Serialize)]
struct HeightEntry {
    x: i32,
    y: i32,
    height: i32,
}

pub fn run(args: &SampleArgs) -> Result<(), Box<dyn Error>> {
    let spec = read_region(&args.region)?;
    let mut config = match &args.config {
        Some(path) => SamplerConfig::load(path)?,
        None => SamplerConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }

    let mut session = Session::new(&spec, config)?;
    if let Some(path) = &args.edits {
        let edits: Vec<RegionEdit> = read_json(path)?;
        let changed = session.repair_region(&edits)?;
        info!(edits = edits.len(), changed = changed.len(), "region edits applied");
    }
    for &(hole, delta) in &args.windings {
        let changed = session.adjust_hole_winding(hole, delta)?;
        info!(hole, delta, changed = changed.len(), "hole winding adjusted");
    }

    if args.loops.is_some() && args.samples < 2 {
        return Err("--loops needs at least two samples".into());
    }

    let mut samples = Vec::with_capacity(args.samples);
    let mut overlay: Vec<DimerConfiguration> = Vec::with_capacity(2);
    for index in 0..args.samples {
        session.sample(&NoopMonitor)?;
        if overlay.len() < 2 {
            overlay.push(session.configuration().clone());
        }
        let heights = args.heights.then(|| {
            session
                .heights()
                .iter()
                .map(|(point, height)| HeightEntry {
                    x: point.x,
                    y: point.y,
                    height,
                })
                .collect()
        });
        samples.push(SampleRecord {
            index,
            hash: session.configuration_hash(),
            dimers: session.export_configuration(),
            heights,
        });
    }

    let loops = match (args.loops, overlay.as_slice()) {
        (Some(min_size), [first, second]) => {
            let graph = session.graph();
            let found = double_dimer_loops(graph, first, second)?;
            info!(loops = found.len(), min_size, "double-dimer overlay built");
            Some(LoopReport {
                min_size,
                size_counts: loop_size_counts(&found),
                loops: found
                    .iter()
                    .filter(|lp| lp.size() >= min_size)
                    .map(|lp| lp.cells.iter().map(|&id| graph.cell(id)).collect())
                    .collect(),
            })
        }
        _ => None,
    };
    let fluctuations = match args.fluctuations {
        Some(count) => Some(session.fluctuations(count, &NoopMonitor)?),
        None => None,
    };

    let report = SampleReport {
        region_hash: canonical_hash(session.graph()),
        mode: session.config().mode,
        master_seed: session.config().seed_policy.master_seed,
        label: session.config().seed_policy.label.clone(),
        samples,
        loops,
        fluctuations,
        holes: session.holes(),
        diagnostics: session.diagnostics(),
    };
    emit_json(args.out.as_deref(), &report)
}
