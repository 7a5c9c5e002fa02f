use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use dimer_core::{Color, ErrorInfo, NoopMonitor};
use dimer_flow::initialize_with_stats;
use dimer_graph::{canonical_hash, RegionGraph};
use serde::Serialize;

use super::{emit_json, read_region};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON region descriptor.
    #[arg(long)]
    pub region: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    feasible: bool,
    cells: usize,
    black: usize,
    white: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    faces: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    batches: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow_phases: Option<usize>,
    holes: Vec<HoleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

#[derive(Debug, Serialize)]
struct HoleSummary {
    id: usize,
    cells: usize,
    boundary: usize,
    cut_crossings: usize,
    min_winding: i32,
    max_winding: i32,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let spec = read_region(&args.region)?;
    let mut report = CheckReport {
        cells: spec.cells.len(),
        black: spec.cells.iter().filter(|cell| cell.color == Color::Black).count(),
        white: spec.cells.iter().filter(|cell| cell.color == Color::White).count(),
        ..CheckReport::default()
    };
    match RegionGraph::build(&spec) {
        Ok(graph) => {
            report.cells = graph.len();
            report.black = graph.blacks().len();
            report.white = graph.whites().len();
            report.region_hash = Some(canonical_hash(&graph));
            report.faces = Some(graph.faces().len());
            report.batches = Some(graph.batches().len());
            report.holes = graph
                .holes()
                .iter()
                .map(|hole| {
                    let (min_winding, max_winding) = hole.winding_bounds();
                    HoleSummary {
                        id: hole.id,
                        cells: hole.cells.len(),
                        boundary: hole.boundary.len(),
                        cut_crossings: hole.cut.len(),
                        min_winding,
                        max_winding,
                    }
                })
                .collect();
            match initialize_with_stats(&graph, &NoopMonitor) {
                Ok((_, stats)) => {
                    report.feasible = true;
                    report.flow_phases = Some(stats.phases);
                }
                Err(err) => report.error = Some(err.info().clone()),
            }
        }
        Err(err) => report.error = Some(err.info().clone()),
    }
    emit_json(args.out.as_deref(), &report)?;
    if !report.feasible {
        return Err("region admits no tiling".into());
    }
    Ok(())
}
