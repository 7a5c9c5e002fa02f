use dimer_core::{ErrorInfo, Monitor, TilingError};
use dimer_graph::{DimerConfiguration, RegionGraph};
use tracing::{info, warn};

use crate::dinic::FlowNetwork;

/// Counters describing one max-flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowStats {
    /// Final flow value.
    pub flow: usize,
    /// Number of BFS level phases.
    pub phases: usize,
}

/// Produces one perfect matching of `graph`, or `InfeasibleRegion` if none exists.
pub fn initialize(
    graph: &RegionGraph,
    monitor: &dyn Monitor,
) -> Result<DimerConfiguration, TilingError> {
    initialize_with_stats(graph, monitor).map(|(config, _)| config)
}

/// Like [`initialize`], also reporting flow counters.
pub fn initialize_with_stats(
    graph: &RegionGraph,
    monitor: &dyn Monitor,
) -> Result<(DimerConfiguration, FlowStats), TilingError> {
    let target = graph.blacks().len();
    if target != graph.whites().len() {
        return Err(TilingError::InfeasibleRegion(
            ErrorInfo::new("color-imbalance", "black and white cell counts differ")
                .with_context("black", target)
                .with_context("white", graph.whites().len()),
        ));
    }
    let mut network = FlowNetwork::bipartite(graph);
    let (flow, phases) = network.max_flow(target, monitor)?;
    let config = network.matching(graph);
    if flow < target {
        let mut info = ErrorInfo::new("no-perfect-matching", "maximum flow is below the cell count")
            .with_context("flow", flow)
            .with_context("target", target)
            .with_hint("edit the region so every cell can be paired");
        if let Some(cell) = config.unmatched().next() {
            info = info.with_context("cell", graph.cell(cell));
        }
        warn!(flow, target, "region admits no perfect matching");
        return Err(TilingError::InfeasibleRegion(info));
    }
    info!(cells = graph.len(), phases, "perfect matching initialised");
    Ok((config, FlowStats { flow, phases }))
}
