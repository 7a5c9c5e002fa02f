use dimer_core::{Cell, Color, Dimer, ErrorInfo, TilingError};

use crate::face::{Face, FaceState};
use crate::region::{CellId, RegionGraph};

/// Sentinel stored for cells without a mate.
pub const UNMATCHED: CellId = CellId::MAX;

/// Dense dimer configuration: `mate[cell]` is the cell it is paired with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimerConfiguration {
    mate: Vec<CellId>,
}

impl DimerConfiguration {
    /// Configuration with every cell of `graph` unmatched.
    pub fn empty(graph: &RegionGraph) -> Self {
        Self {
            mate: vec![UNMATCHED; graph.len()],
        }
    }

    /// Number of cells covered by the configuration vector.
    pub fn len(&self) -> usize {
        self.mate.len()
    }

    /// Whether the configuration is over an empty cell set.
    pub fn is_empty(&self) -> bool {
        self.mate.is_empty()
    }

    /// Mate of `cell`.
    pub fn mate(&self, cell: CellId) -> Option<CellId> {
        match self.mate[cell as usize] {
            UNMATCHED => None,
            other => Some(other),
        }
    }

    /// Raw mate vector.
    pub fn mates(&self) -> &[CellId] {
        &self.mate
    }

    /// Pairs `a` with `b`, dropping any previous partners of either.
    pub fn pair(&mut self, a: CellId, b: CellId) {
        self.unpair(a);
        self.unpair(b);
        self.mate[a as usize] = b;
        self.mate[b as usize] = a;
    }

    /// Removes the dimer containing `cell`, if any.
    pub fn unpair(&mut self, cell: CellId) {
        if let Some(other) = self.mate(cell) {
            self.mate[other as usize] = UNMATCHED;
            self.mate[cell as usize] = UNMATCHED;
        }
    }

    /// Whether every cell is matched.
    pub fn is_perfect(&self) -> bool {
        self.mate.iter().all(|&mate| mate != UNMATCHED)
    }

    /// Cells without a mate.
    pub fn unmatched(&self) -> impl Iterator<Item = CellId> + '_ {
        self.mate
            .iter()
            .enumerate()
            .filter(|(_, &mate)| mate == UNMATCHED)
            .map(|(idx, _)| idx as CellId)
    }

    /// Current orientation of `face`.
    pub fn face_state(&self, face: &Face) -> FaceState {
        for state in [FaceState::Down, FaceState::Up] {
            if face
                .pattern(state)
                .all(|(black, white)| self.mate[black as usize] == white)
            {
                return state;
            }
        }
        FaceState::Frozen
    }

    /// Rewrites the dimers of a face that is currently up or down.
    pub fn set_face(&mut self, face: &Face, state: FaceState) {
        for (black, white) in face.pattern(state) {
            self.mate[black as usize] = white;
            self.mate[white as usize] = black;
        }
    }

    /// Number of cells whose mate differs from `other`.
    pub fn gap(&self, other: &DimerConfiguration) -> usize {
        self.mate
            .iter()
            .zip(&other.mate)
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Cells whose mate differs from `other`.
    pub fn differing(&self, other: &DimerConfiguration) -> Vec<CellId> {
        self.mate
            .iter()
            .zip(&other.mate)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(idx, _)| idx as CellId)
            .collect()
    }

    /// Dimers as coordinate pairs, ordered by black cell.
    pub fn dimers(&self, graph: &RegionGraph) -> Vec<Dimer> {
        graph
            .blacks()
            .iter()
            .filter_map(|&black| {
                self.mate(black).map(|white| Dimer {
                    black: graph.cell(black),
                    white: graph.cell(white),
                })
            })
            .collect()
    }

    /// Rebuilds a perfect matching from a dimer list.
    pub fn from_dimers(graph: &RegionGraph, dimers: &[Dimer]) -> Result<Self, TilingError> {
        let mut config = Self::empty(graph);
        for dimer in dimers {
            let black = lookup(graph, dimer.black, Color::Black)?;
            let white = lookup(graph, dimer.white, Color::White)?;
            if !graph.are_adjacent(black, white) {
                return Err(TilingError::InvalidInput(
                    ErrorInfo::new("not-adjacent", "dimer cells do not share a side")
                        .with_context("black", dimer.black)
                        .with_context("white", dimer.white),
                ));
            }
            for (id, cell) in [(black, dimer.black), (white, dimer.white)] {
                if config.mate(id).is_some() {
                    return Err(TilingError::InvalidInput(
                        ErrorInfo::new("double-matched", "cell appears in two dimers")
                            .with_context("cell", cell),
                    ));
                }
            }
            config.pair(black, white);
        }
        config.validate(graph)?;
        Ok(config)
    }

    /// Checks that the configuration is a perfect matching of `graph`.
    pub fn validate(&self, graph: &RegionGraph) -> Result<(), TilingError> {
        if self.mate.len() != graph.len() {
            return Err(TilingError::InvalidInput(
                ErrorInfo::new("size-mismatch", "configuration does not match the region")
                    .with_context("configuration", self.mate.len())
                    .with_context("region", graph.len()),
            ));
        }
        for (idx, &mate) in self.mate.iter().enumerate() {
            let cell = idx as CellId;
            let coords = graph.cell(cell);
            if mate == UNMATCHED {
                return Err(TilingError::InvalidInput(
                    ErrorInfo::new("uncovered-cell", "cell is not covered by a dimer")
                        .with_context("cell", coords),
                ));
            }
            if mate as usize >= self.mate.len() || self.mate[mate as usize] != cell {
                return Err(TilingError::InvalidInput(
                    ErrorInfo::new("asymmetric-mate", "mate relation is not symmetric")
                        .with_context("cell", coords),
                ));
            }
            if !graph.are_adjacent(cell, mate) {
                return Err(TilingError::InvalidInput(
                    ErrorInfo::new("not-adjacent", "cell is matched across a non-side")
                        .with_context("cell", coords)
                        .with_context("mate", graph.cell(mate)),
                ));
            }
        }
        Ok(())
    }
}

fn lookup(graph: &RegionGraph, cell: Cell, color: Color) -> Result<CellId, TilingError> {
    if cell.color != color {
        return Err(TilingError::InvalidInput(
            ErrorInfo::new("color-mismatch", "dimer end has the wrong colour")
                .with_context("cell", cell),
        ));
    }
    graph.id_of(&cell).ok_or_else(|| {
        TilingError::InvalidInput(
            ErrorInfo::new("unknown-cell", "dimer references a cell outside the region")
                .with_context("cell", cell),
        )
    })
}
