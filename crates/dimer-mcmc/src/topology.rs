use std::collections::{BTreeMap, BTreeSet, VecDeque};

use dimer_core::{Cell, Dimer, ErrorInfo, TilingError};
use dimer_flow::{augment_within, neighborhood};
use dimer_graph::{CellId, DimerConfiguration, Hole, RegionGraph, RegionSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Largest flux excursion tracked while searching for a rerouting cycle.
const FLUX_RANGE: i32 = 4;
const FLUX_SLOTS: usize = (2 * FLUX_RANGE + 1) as usize;
const UNSET: u32 = u32::MAX;

/// A structural edit of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "cell", rename_all = "kebab-case")]
pub enum RegionEdit {
    /// Include a cell.
    Added(Cell),
    /// Exclude a cell.
    Removed(Cell),
}

/// Reported state of one hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleStatus {
    /// Hole index.
    pub id: usize,
    /// Current winding number.
    pub winding: i32,
    /// Lowest winding the hole's cut admits.
    pub min_winding: i32,
    /// Highest winding the hole's cut admits.
    pub max_winding: i32,
    /// Excluded cells of the hole.
    pub cells: Vec<Cell>,
    /// Region cells touching the hole.
    pub boundary: Vec<Cell>,
    /// Dimers on the hole's cut that realise the winding.
    pub realizing: Vec<Dimer>,
}

/// Result of a successful local repair.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Graph of the edited region.
    pub graph: RegionGraph,
    /// Perfect matching of the edited region.
    pub configuration: DimerConfiguration,
    /// Cells whose partner changed or that were added.
    pub changed: Vec<Cell>,
}

/// Hole windings, configuration checks, winding changes and local repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyTracker {
    winding_band: usize,
    repair_radius: usize,
    windings: Vec<i32>,
}

impl TopologyTracker {
    /// Tracker with the given search radii and no cached windings.
    pub fn new(winding_band: usize, repair_radius: usize) -> Self {
        Self {
            winding_band,
            repair_radius,
            windings: Vec::new(),
        }
    }

    /// Recomputes cached windings. Face flips never change them.
    pub fn refresh(&mut self, graph: &RegionGraph, config: &DimerConfiguration) {
        self.windings = graph
            .holes()
            .iter()
            .map(|hole| hole.winding(config))
            .collect();
    }

    /// Cached winding numbers, one per hole.
    pub fn windings(&self) -> &[i32] {
        &self.windings
    }

    /// Full per-hole report.
    pub fn status(&self, graph: &RegionGraph, config: &DimerConfiguration) -> Vec<HoleStatus> {
        graph
            .holes()
            .iter()
            .map(|hole| {
                let (min_winding, max_winding) = hole.winding_bounds();
                HoleStatus {
                    id: hole.id,
                    winding: hole.winding(config),
                    min_winding,
                    max_winding,
                    cells: hole.cells.clone(),
                    boundary: hole.boundary.iter().map(|&id| graph.cell(id)).collect(),
                    realizing: hole
                        .realizing(config)
                        .into_iter()
                        .map(|(black, white)| Dimer {
                            black: graph.cell(black),
                            white: graph.cell(white),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Checks that `config` is a perfect matching of `graph`.
    pub fn validate(&self, graph: &RegionGraph, config: &DimerConfiguration) -> Result<(), TilingError> {
        config.validate(graph)
    }

    /// Changes the winding of `hole` by `delta` through alternating cycles near the hole.
    ///
    /// Either all `|delta|` unit changes succeed or `config` is left untouched.
    /// Returns the cells whose partner changed.
    pub fn adjust_hole_winding(
        &mut self,
        graph: &RegionGraph,
        config: &mut DimerConfiguration,
        hole: usize,
        delta: i32,
    ) -> Result<Vec<Cell>, TilingError> {
        let target_hole = graph.holes().get(hole).ok_or_else(|| {
            TilingError::InvalidInput(
                ErrorInfo::new("unknown-hole", "hole index out of range")
                    .with_context("hole", hole)
                    .with_context("holes", graph.holes().len()),
            )
        })?;
        if delta == 0 {
            return Ok(Vec::new());
        }
        let before = target_hole.winding(config);
        let allowed = neighborhood(graph, &target_hole.boundary, self.winding_band);
        let step = delta.signum();
        let mut working = config.clone();
        for applied in 0..delta.abs() {
            let Some(cycle) = find_rerouting(graph, &working, target_hole, &allowed, step) else {
                warn!(hole, delta, applied, "no local rerouting changes the winding");
                return Err(TilingError::WindingUnreachable(
                    ErrorInfo::new("no-alternating-cycle", "no alternating cycle near the hole changes its winding")
                        .with_context("hole", hole)
                        .with_context("winding", before)
                        .with_context("delta", delta)
                        .with_context("band", self.winding_band)
                        .with_hint("widen winding_band or reinitialise the region"),
                ));
            };
            let whites: Vec<CellId> = cycle.iter().filter_map(|&black| working.mate(black)).collect();
            for (idx, &white) in whites.iter().enumerate() {
                working.pair(cycle[(idx + 1) % cycle.len()], white);
            }
        }
        let after = target_hole.winding(&working);
        if after != before + delta {
            return Err(TilingError::WindingUnreachable(
                ErrorInfo::new("winding-mismatch", "rerouting produced an unexpected winding")
                    .with_context("hole", hole)
                    .with_context("expected", before + delta)
                    .with_context("found", after),
            ));
        }
        let changed = working
            .differing(config)
            .into_iter()
            .map(|id| graph.cell(id))
            .collect();
        *config = working;
        self.refresh(graph, config);
        debug!(hole, before, after, "hole winding adjusted");
        Ok(changed)
    }

    /// Applies `edits` to the region and re-covers it locally.
    ///
    /// Dimers untouched by the edit are kept; the remaining cells are matched by
    /// augmenting paths inside `repair_radius` of the edit. Fails with
    /// `RepairImpossible` when no such local fix exists. Cached windings are
    /// left alone; callers refresh them once they adopt the outcome.
    pub fn repair_region(
        &self,
        graph: &RegionGraph,
        config: &DimerConfiguration,
        edits: &[RegionEdit],
    ) -> Result<RepairOutcome, TilingError> {
        let spec = edited_spec(graph, edits)?;
        let edited = RegionGraph::build(&spec).map_err(|err| match err {
            TilingError::InfeasibleRegion(info) => TilingError::RepairImpossible(
                info.with_hint("the edit breaks feasibility; a full reinitialisation is required"),
            ),
            other => other,
        })?;

        let mut repaired = DimerConfiguration::empty(&edited);
        for dimer in config.dimers(graph) {
            if let (Some(black), Some(white)) = (edited.id_of(&dimer.black), edited.id_of(&dimer.white)) {
                repaired.pair(black, white);
            }
        }

        let mut seeds = BTreeSet::new();
        for edit in edits {
            match edit {
                RegionEdit::Added(cell) => seeds.extend(edited.id_of(cell)),
                RegionEdit::Removed(cell) => seeds.extend(
                    dimer_graph::lattice::neighbors(edited.lattice(), *cell)
                        .iter()
                        .filter_map(|neighbor| edited.id_of(neighbor)),
                ),
            }
        }
        let seeds: Vec<CellId> = seeds.into_iter().collect();
        let allowed = neighborhood(&edited, &seeds, self.repair_radius);
        let remaining = augment_within(&edited, &mut repaired, &allowed);
        if let Some(&stuck) = remaining.first() {
            warn!(unmatched = remaining.len(), "local repair failed");
            return Err(TilingError::RepairImpossible(
                ErrorInfo::new("no-local-fix", "no augmenting path inside the repair radius")
                    .with_context("cell", edited.cell(stuck))
                    .with_context("unmatched", remaining.len())
                    .with_context("radius", self.repair_radius)
                    .with_hint("reinitialise the region with the max-flow initializer"),
            ));
        }

        let previous: BTreeMap<Cell, Cell> = config
            .dimers(graph)
            .into_iter()
            .flat_map(|dimer| [(dimer.black, dimer.white), (dimer.white, dimer.black)])
            .collect();
        let changed: Vec<Cell> = (0..edited.len() as CellId)
            .filter(|&id| {
                let cell = edited.cell(id);
                let now = repaired.mate(id).map(|mate| edited.cell(mate));
                previous.get(&cell).copied() != now
            })
            .map(|id| edited.cell(id))
            .collect();
        debug!(edits = edits.len(), changed = changed.len(), "region repaired locally");
        Ok(RepairOutcome {
            graph: edited,
            configuration: repaired,
            changed,
        })
    }
}

fn edited_spec(graph: &RegionGraph, edits: &[RegionEdit]) -> Result<RegionSpec, TilingError> {
    let mut spec = graph.spec();
    let mut cells: BTreeSet<Cell> = spec.cells.into_iter().collect();
    let mut holes: BTreeSet<Cell> = spec.holes.into_iter().collect();
    for edit in edits {
        match *edit {
            RegionEdit::Added(cell) => {
                holes.remove(&cell);
                if !cells.insert(cell) {
                    return Err(TilingError::InvalidInput(
                        ErrorInfo::new("noop-edit", "added cell is already in the region")
                            .with_context("cell", cell),
                    ));
                }
            }
            RegionEdit::Removed(cell) => {
                if !cells.remove(&cell) {
                    return Err(TilingError::InvalidInput(
                        ErrorInfo::new("noop-edit", "removed cell is not in the region")
                            .with_context("cell", cell),
                    ));
                }
            }
        }
    }
    spec.cells = cells.into_iter().collect();
    spec.holes = holes.into_iter().collect();
    Ok(spec)
}

/// Finds a simple alternating cycle, given by its black cells in order, whose
/// flip changes the flux through the hole's cut by `target`.
///
/// The search runs over `(black cell, flux change)` states: from a black cell
/// the walk follows its dimer to the white partner and then any other side of
/// that white cell to the next black cell.
fn find_rerouting(
    graph: &RegionGraph,
    config: &DimerConfiguration,
    hole: &Hole,
    allowed: &[bool],
    target: i32,
) -> Option<Vec<CellId>> {
    let signs: BTreeMap<(CellId, CellId), i32> = hole
        .cut
        .iter()
        .map(|crossing| ((crossing.black, crossing.white), crossing.sign))
        .collect();
    let sign = |black: CellId, white: CellId| signs.get(&(black, white)).copied().unwrap_or(0);

    let band: Vec<CellId> = graph
        .blacks()
        .iter()
        .copied()
        .filter(|&black| allowed[black as usize])
        .collect();
    let mut local = vec![UNSET; graph.len()];
    for (idx, &black) in band.iter().enumerate() {
        local[black as usize] = idx as u32;
    }
    let starts: BTreeSet<CellId> = hole
        .cut
        .iter()
        .map(|crossing| crossing.black)
        .filter(|&black| allowed[black as usize])
        .collect();

    let slot = |black: CellId, flux: i32| local[black as usize] as usize * FLUX_SLOTS + (flux + FLUX_RANGE) as usize;
    let mut best: Option<Vec<CellId>> = None;
    for &start in &starts {
        let mut parent: Vec<Option<usize>> = vec![None; band.len() * FLUX_SLOTS];
        let mut seen = vec![false; band.len() * FLUX_SLOTS];
        let origin = slot(start, 0);
        seen[origin] = true;
        let mut queue = VecDeque::from([(start, 0i32)]);
        let mut found = None;
        'search: while let Some((black, flux)) = queue.pop_front() {
            let Some(white) = config.mate(black) else {
                continue;
            };
            if !allowed[white as usize] {
                continue;
            }
            let after_removal = flux - sign(black, white);
            for &next in graph.neighbors(white) {
                if next == black || local[next as usize] == UNSET {
                    continue;
                }
                let next_flux = after_removal + sign(next, white);
                if next_flux.abs() > FLUX_RANGE {
                    continue;
                }
                let from = slot(black, flux);
                if next == start && next_flux == target {
                    found = Some(from);
                    break 'search;
                }
                let to = slot(next, next_flux);
                if !seen[to] {
                    seen[to] = true;
                    parent[to] = Some(from);
                    queue.push_back((next, next_flux));
                }
            }
        }
        let Some(last) = found else {
            continue;
        };
        let mut walk = vec![start];
        let mut cursor = Some(last);
        while let Some(state) = cursor {
            walk.push(band[state / FLUX_SLOTS]);
            cursor = parent[state];
        }
        walk.reverse();
        let Some(cycle) = simple_cycle(config, &walk, &sign, target) else {
            continue;
        };
        if best.as_ref().map_or(true, |current| cycle.len() < current.len()) {
            best = Some(cycle);
        }
    }
    best
}

/// Splits a closed walk of black cells into simple loops and returns one whose
/// flux change equals `target`.
fn simple_cycle(
    config: &DimerConfiguration,
    walk: &[CellId],
    sign: &impl Fn(CellId, CellId) -> i32,
    target: i32,
) -> Option<Vec<CellId>> {
    let flux = |blacks: &[CellId]| -> i32 {
        blacks
            .iter()
            .enumerate()
            .map(|(idx, &black)| {
                let white = config.mate(black).unwrap_or(black);
                let next = blacks[(idx + 1) % blacks.len()];
                sign(next, white) - sign(black, white)
            })
            .sum()
    };
    let mut stack: Vec<CellId> = Vec::new();
    let mut position: BTreeMap<CellId, usize> = BTreeMap::new();
    for &black in walk {
        if let Some(&at) = position.get(&black) {
            let loop_cells = stack[at..].to_vec();
            if flux(&loop_cells) == target {
                return Some(loop_cells);
            }
            for removed in stack.drain(at + 1..) {
                position.remove(&removed);
            }
        } else {
            position.insert(black, stack.len());
            stack.push(black);
        }
    }
    None
}
