use dimer_core::{Cell, Color, LatticeKind};
use sha2::{Digest, Sha256};

use crate::matching::DimerConfiguration;
use crate::region::RegionGraph;

/// Computes the canonical structural hash of a region.
pub fn canonical_hash(graph: &RegionGraph) -> String {
    let mut hasher = Sha256::new();
    encode_region(graph, &mut hasher);
    format!("{:x}", hasher.finalize())
}

/// Hash of a configuration together with the region it lives on.
pub fn configuration_hash(graph: &RegionGraph, config: &DimerConfiguration) -> String {
    let mut hasher = Sha256::new();
    encode_region(graph, &mut hasher);
    let dimers = config.dimers(graph);
    hasher.update(b"dimers");
    hasher.update((dimers.len() as u64).to_le_bytes());
    for dimer in dimers {
        encode_cell(&dimer.black, &mut hasher);
        encode_cell(&dimer.white, &mut hasher);
    }
    format!("{:x}", hasher.finalize())
}

fn encode_region(graph: &RegionGraph, hasher: &mut Sha256) {
    match graph.lattice() {
        LatticeKind::Square => hasher.update(b"lattice:square"),
        LatticeKind::Triangular => hasher.update(b"lattice:triangular"),
    }
    hasher.update((graph.len() as u64).to_le_bytes());
    for cell in graph.cells() {
        encode_cell(cell, hasher);
    }
    hasher.update((graph.holes().len() as u64).to_le_bytes());
    let excluded = graph.explicit_holes();
    hasher.update(b"excluded");
    hasher.update((excluded.len() as u64).to_le_bytes());
    for cell in excluded {
        encode_cell(cell, hasher);
    }
}

fn encode_cell(cell: &Cell, hasher: &mut Sha256) {
    hasher.update(cell.x.to_le_bytes());
    hasher.update(cell.y.to_le_bytes());
    hasher.update(match cell.color {
        Color::Black => [0u8],
        Color::White => [1u8],
    });
}
