use dimer_core::Point;
use serde::{Deserialize, Serialize};

use crate::region::CellId;

/// Index of a face inside a [`crate::RegionGraph`].
pub type FaceId = usize;

/// An elementary face: the alternating cycle of region cells around one lattice point.
///
/// `cells` lists the cycle counter-clockwise starting at a black cell. The
/// pairing `(c0,c1),(c2,c3),..` is the lower orientation and the pairing
/// `(c1,c2),..,(c_last,c0)` the higher one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Lattice point at the centre of the face.
    pub center: Point,
    /// Cells of the cycle.
    pub cells: Vec<CellId>,
}

/// Orientation of the dimers currently occupying a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaceState {
    /// The lower of the two face-local patterns.
    Down,
    /// The higher of the two face-local patterns.
    Up,
    /// The cycle is not covered by either pattern; no flip is possible.
    Frozen,
}

impl Face {
    /// Pairs `(black, white)` of the requested orientation.
    pub fn pattern(&self, state: FaceState) -> impl Iterator<Item = (CellId, CellId)> + '_ {
        let len = self.cells.len();
        let offset = match state {
            FaceState::Up => 1,
            _ => 0,
        };
        (0..len / 2).map(move |pair| {
            let first = self.cells[(2 * pair + offset) % len];
            let second = self.cells[(2 * pair + offset + 1) % len];
            if offset == 0 {
                (first, second)
            } else {
                (second, first)
            }
        })
    }
}

/// Greedy colouring of faces into batches whose members share no cell.
pub(crate) fn color_batches(faces: &[Face], cell_count: usize) -> Vec<Vec<FaceId>> {
    let mut used: Vec<u64> = vec![0; cell_count];
    let mut batches: Vec<Vec<FaceId>> = Vec::new();
    for (face_id, face) in faces.iter().enumerate() {
        let taken = face
            .cells
            .iter()
            .fold(0u64, |mask, &cell| mask | used[cell as usize]);
        let color = taken.trailing_ones() as usize;
        if batches.len() <= color {
            batches.resize_with(color + 1, Vec::new);
        }
        batches[color].push(face_id);
        for &cell in &face.cells {
            used[cell as usize] |= 1 << color;
        }
    }
    batches
}
