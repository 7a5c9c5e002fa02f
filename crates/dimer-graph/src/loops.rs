//! Overlay of two dimer configurations of the same region.
//!
//! Every cell carries one dimer from each configuration, so the overlay splits
//! into doubled dimers and closed loops whose dimers alternate between the two.

use std::collections::BTreeMap;

use dimer_core::{Dimer, TilingError};
use serde::{Deserialize, Serialize};

use crate::matching::DimerConfiguration;
use crate::region::{CellId, RegionGraph};

/// One component of the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleDimerLoop {
    /// Cells in walking order. `cells[2i]` and `cells[2i + 1]` share a dimer
    /// of the first configuration; `cells[2i + 1]` and the next black cell
    /// share a dimer of the second.
    pub cells: Vec<CellId>,
}

impl DoubleDimerLoop {
    /// Dimers on the loop, counting both configurations; a doubled dimer counts twice.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Whether both configurations place the same dimer here.
    pub fn is_doubled(&self) -> bool {
        self.cells.len() == 2
    }

    /// The loop's dimers from the first and the second configuration.
    pub fn dimers(&self, graph: &RegionGraph) -> (Vec<Dimer>, Vec<Dimer>) {
        let len = self.cells.len();
        let dimer = |black: CellId, white: CellId| Dimer {
            black: graph.cell(black),
            white: graph.cell(white),
        };
        let first = (0..len / 2)
            .map(|pair| dimer(self.cells[2 * pair], self.cells[2 * pair + 1]))
            .collect();
        let second = (0..len / 2)
            .map(|pair| dimer(self.cells[(2 * pair + 2) % len], self.cells[2 * pair + 1]))
            .collect();
        (first, second)
    }
}

/// Splits the overlay of `first` and `second` into loops, ordered by their
/// smallest black cell.
pub fn double_dimer_loops(
    graph: &RegionGraph,
    first: &DimerConfiguration,
    second: &DimerConfiguration,
) -> Result<Vec<DoubleDimerLoop>, TilingError> {
    first.validate(graph)?;
    second.validate(graph)?;
    let mut visited = vec![false; graph.len()];
    let mut loops = Vec::new();
    for &start in graph.blacks() {
        if visited[start as usize] {
            continue;
        }
        let mut cells = Vec::new();
        let mut black = start;
        while let Some(white) = first.mate(black) {
            visited[black as usize] = true;
            visited[white as usize] = true;
            cells.push(black);
            cells.push(white);
            match second.mate(white) {
                Some(next) if next != start && !visited[next as usize] => black = next,
                _ => break,
            }
        }
        loops.push(DoubleDimerLoop { cells });
    }
    Ok(loops)
}

/// Number of loops of each size.
pub fn loop_size_counts(loops: &[DoubleDimerLoop]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for size in loops.iter().map(DoubleDimerLoop::size) {
        *counts.entry(size).or_default() += 1;
    }
    counts
}
