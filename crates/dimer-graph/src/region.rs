use std::collections::BTreeSet;

use dimer_core::{Cell, Color, ErrorInfo, LatticeKind, Point, TilingError};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::face::{color_batches, Face, FaceId};
use crate::height::HeightTree;
use crate::holes::{locate_holes, Hole};
use crate::lattice::{cells_around, check_cell, neighbors, vertices};

/// Dense index of a cell inside a [`RegionGraph`].
pub type CellId = u32;

/// Caller supplied description of a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Lattice the cells live on.
    pub lattice: LatticeKind,
    /// Included cells.
    pub cells: Vec<Cell>,
    /// Explicitly excluded cells. These override `cells`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Cell>,
}

impl RegionSpec {
    /// Region made of `cells` with no explicit holes.
    pub fn new(lattice: LatticeKind, cells: Vec<Cell>) -> Self {
        Self {
            lattice,
            cells,
            holes: Vec::new(),
        }
    }

    /// Adds explicitly excluded cells.
    pub fn with_holes(mut self, holes: Vec<Cell>) -> Self {
        self.holes = holes;
        self
    }
}

/// Immutable bipartite adjacency of a region.
///
/// Cells are packed into an arena ordered by `(x, y, color)`; everything
/// downstream works with [`CellId`] indices and never hashes coordinates.
#[derive(Debug, Clone)]
pub struct RegionGraph {
    lattice: LatticeKind,
    cells: IndexSet<Cell>,
    offsets: Vec<usize>,
    adjacency: Vec<CellId>,
    blacks: Vec<CellId>,
    whites: Vec<CellId>,
    faces: Vec<Face>,
    batches: Vec<Vec<FaceId>>,
    face_offsets: Vec<usize>,
    cell_faces: Vec<FaceId>,
    holes: Vec<Hole>,
    explicit_holes: Vec<Cell>,
    heights: HeightTree,
}

impl RegionGraph {
    /// Builds the graph, failing fast on regions that cannot be tiled.
    pub fn build(spec: &RegionSpec) -> Result<Self, TilingError> {
        let lattice = spec.lattice;
        for &cell in spec.cells.iter().chain(spec.holes.iter()) {
            check_cell(lattice, cell)?;
        }
        let excluded: BTreeSet<Cell> = spec.holes.iter().copied().collect();
        let included: BTreeSet<Cell> = spec
            .cells
            .iter()
            .copied()
            .filter(|cell| !excluded.contains(cell))
            .collect();

        if included.is_empty() {
            return Err(TilingError::InfeasibleRegion(ErrorInfo::new(
                "empty-region",
                "region contains no cells",
            )));
        }
        if included.len() >= CellId::MAX as usize {
            return Err(TilingError::InvalidInput(
                ErrorInfo::new("region-too-large", "cell count exceeds the index range")
                    .with_context("cells", included.len()),
            ));
        }
        let black = included
            .iter()
            .filter(|cell| cell.color == Color::Black)
            .count();
        let white = included.len() - black;
        if black != white {
            return Err(TilingError::InfeasibleRegion(
                ErrorInfo::new("color-imbalance", "black and white cell counts differ")
                    .with_context("black", black)
                    .with_context("white", white)
                    .with_hint("every dimer covers one black and one white cell"),
            ));
        }

        let cells: IndexSet<Cell> = included.into_iter().collect();
        let mut offsets = Vec::with_capacity(cells.len() + 1);
        let mut adjacency = Vec::with_capacity(cells.len() * lattice.sides());
        let mut blacks = Vec::with_capacity(black);
        let mut whites = Vec::with_capacity(white);
        offsets.push(0);
        for (idx, &cell) in cells.iter().enumerate() {
            let before = adjacency.len();
            adjacency.extend(
                neighbors(lattice, cell)
                    .into_iter()
                    .filter_map(|neighbor| cells.get_index_of(&neighbor))
                    .map(|id| id as CellId),
            );
            if adjacency.len() == before {
                return Err(TilingError::InfeasibleRegion(
                    ErrorInfo::new("isolated-cell", "cell has no neighbour inside the region")
                        .with_context("cell", cell),
                ));
            }
            offsets.push(adjacency.len());
            match cell.color {
                Color::Black => blacks.push(idx as CellId),
                Color::White => whites.push(idx as CellId),
            }
        }

        let faces = collect_faces(lattice, &cells);
        let batches = color_batches(&faces, cells.len());
        let mut per_cell: Vec<Vec<FaceId>> = vec![Vec::new(); cells.len()];
        for (face_id, face) in faces.iter().enumerate() {
            for &cell in &face.cells {
                per_cell[cell as usize].push(face_id);
            }
        }
        let mut face_offsets = Vec::with_capacity(cells.len() + 1);
        let mut cell_faces = Vec::new();
        face_offsets.push(0);
        for list in per_cell {
            cell_faces.extend(list);
            face_offsets.push(cell_faces.len());
        }

        let holes = locate_holes(lattice, &cells);
        let heights = HeightTree::build(lattice, &cells);
        debug!(
            cells = cells.len(),
            faces = faces.len(),
            batches = batches.len(),
            holes = holes.len(),
            "region graph built"
        );

        Ok(Self {
            lattice,
            cells,
            offsets,
            adjacency,
            blacks,
            whites,
            faces,
            batches,
            face_offsets,
            cell_faces,
            holes,
            explicit_holes: excluded.into_iter().collect(),
            heights,
        })
    }

    /// Lattice of the region.
    pub fn lattice(&self) -> LatticeKind {
        self.lattice
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the region has no cells. Built graphs are never empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell stored at `id`.
    pub fn cell(&self, id: CellId) -> Cell {
        self.cells[id as usize]
    }

    /// Index of `cell`, if it belongs to the region.
    pub fn id_of(&self, cell: &Cell) -> Option<CellId> {
        self.cells.get_index_of(cell).map(|idx| idx as CellId)
    }

    /// All cells in arena order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Region neighbours of `id`.
    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        let idx = id as usize;
        &self.adjacency[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Whether `a` and `b` share a side.
    pub fn are_adjacent(&self, a: CellId, b: CellId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Black cells in arena order.
    pub fn blacks(&self) -> &[CellId] {
        &self.blacks
    }

    /// White cells in arena order.
    pub fn whites(&self) -> &[CellId] {
        &self.whites
    }

    /// Elementary faces.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Face stored at `id`.
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    /// Cell-disjoint face batches.
    pub fn batches(&self) -> &[Vec<FaceId>] {
        &self.batches
    }

    /// Faces whose cycle contains `id`.
    pub fn faces_of(&self, id: CellId) -> &[FaceId] {
        let idx = id as usize;
        &self.cell_faces[self.face_offsets[idx]..self.face_offsets[idx + 1]]
    }

    /// Holes enclosed by the region.
    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Cells the region description excluded explicitly, sorted.
    pub fn explicit_holes(&self) -> &[Cell] {
        &self.explicit_holes
    }

    /// Description that rebuilds this graph.
    pub fn spec(&self) -> RegionSpec {
        RegionSpec {
            lattice: self.lattice,
            cells: self.cells.iter().copied().collect(),
            holes: self.explicit_holes.clone(),
        }
    }

    pub(crate) fn height_tree(&self) -> &HeightTree {
        &self.heights
    }
}

fn collect_faces(lattice: LatticeKind, cells: &IndexSet<Cell>) -> Vec<Face> {
    let points: BTreeSet<Point> = cells
        .iter()
        .flat_map(|&cell| vertices(lattice, cell))
        .collect();
    points
        .into_iter()
        .filter_map(|center| {
            let ids: Option<Vec<CellId>> = cells_around(lattice, center)
                .iter()
                .map(|cell| cells.get_index_of(cell).map(|id| id as CellId))
                .collect();
            ids.map(|cells| Face { center, cells })
        })
        .collect()
}
