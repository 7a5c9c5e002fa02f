//! Square and triangular lattice geometry: sides, neighbours and face cycles.

use std::collections::BTreeMap;

use dimer_core::{Cell, Color, ErrorInfo, LatticeKind, Point, TilingError};

/// One side of a cell, oriented counter-clockwise so the cell lies on its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Side {
    /// Start point of the side.
    pub from: Point,
    /// End point of the side.
    pub to: Point,
    /// The cell across the side.
    pub neighbor: Cell,
}

/// Returns the sides of `cell` in counter-clockwise order.
pub fn sides(lattice: LatticeKind, cell: Cell) -> Vec<Side> {
    let (x, y) = (cell.x, cell.y);
    let side = |fx, fy, tx, ty, neighbor| Side {
        from: Point::new(fx, fy),
        to: Point::new(tx, ty),
        neighbor,
    };
    match (lattice, cell.color) {
        (LatticeKind::Square, _) => vec![
            side(x, y, x + 1, y, Cell::square(x, y - 1)),
            side(x + 1, y, x + 1, y + 1, Cell::square(x + 1, y)),
            side(x + 1, y + 1, x, y + 1, Cell::square(x, y + 1)),
            side(x, y + 1, x, y, Cell::square(x - 1, y)),
        ],
        (LatticeKind::Triangular, Color::Black) => vec![
            side(x, y - 1, x + 1, y - 1, Cell::white(x, y - 1)),
            side(x + 1, y - 1, x, y, Cell::white(x, y)),
            side(x, y, x, y - 1, Cell::white(x - 1, y)),
        ],
        (LatticeKind::Triangular, Color::White) => vec![
            side(x, y, x + 1, y - 1, Cell::black(x, y)),
            side(x + 1, y - 1, x + 1, y, Cell::black(x + 1, y)),
            side(x + 1, y, x, y, Cell::black(x, y + 1)),
        ],
    }
}

/// Cells sharing a side with `cell`, in counter-clockwise order.
pub fn neighbors(lattice: LatticeKind, cell: Cell) -> Vec<Cell> {
    sides(lattice, cell)
        .into_iter()
        .map(|side| side.neighbor)
        .collect()
}

/// Corner points of `cell`.
pub fn vertices(lattice: LatticeKind, cell: Cell) -> Vec<Point> {
    sides(lattice, cell)
        .into_iter()
        .map(|side| side.from)
        .collect()
}

/// Cells incident to `point`, counter-clockwise and starting at a black cell.
///
/// Consecutive entries share a side, so the list is the alternating cycle of a
/// face centred at `point`.
pub fn cells_around(lattice: LatticeKind, point: Point) -> Vec<Cell> {
    let (x, y) = (point.x, point.y);
    match lattice {
        LatticeKind::Square => {
            let ring = [
                Cell::square(x - 1, y - 1),
                Cell::square(x, y - 1),
                Cell::square(x, y),
                Cell::square(x - 1, y),
            ];
            let start = ring
                .iter()
                .position(|cell| cell.color == Color::Black)
                .unwrap_or(0);
            ring.iter()
                .cycle()
                .skip(start)
                .take(ring.len())
                .copied()
                .collect()
        }
        LatticeKind::Triangular => vec![
            Cell::black(x, y + 1),
            Cell::white(x - 1, y + 1),
            Cell::black(x - 1, y + 1),
            Cell::white(x - 1, y),
            Cell::black(x, y),
            Cell::white(x, y),
        ],
    }
}

/// Coordinates stay this far from the `i32` limits so neighbours, corners and
/// the ring around a region remain representable.
const COORD_MARGIN: i32 = 2;

/// Checks that `cell` exists on `lattice`.
pub fn check_cell(lattice: LatticeKind, cell: Cell) -> Result<(), TilingError> {
    let range = i32::MIN + COORD_MARGIN..=i32::MAX - COORD_MARGIN;
    if !range.contains(&cell.x) || !range.contains(&cell.y) {
        return Err(TilingError::InvalidInput(
            ErrorInfo::new("coordinate-range", "cell coordinates are too close to the integer limits")
                .with_context("cell", cell)
                .with_context("min", range.start())
                .with_context("max", range.end()),
        ));
    }
    if lattice == LatticeKind::Square && Cell::square(cell.x, cell.y).color != cell.color {
        return Err(TilingError::InvalidInput(
            ErrorInfo::new(
                "color-mismatch",
                "square cell colour must follow coordinate parity",
            )
            .with_context("cell", cell)
            .with_hint("black square cells have x + y even"),
        ));
    }
    Ok(())
}

/// Directed lattice edges of a cell set, mapped to the cells on their left and right.
pub(crate) fn side_map<'a>(
    lattice: LatticeKind,
    cells: impl IntoIterator<Item = &'a Cell>,
) -> BTreeMap<(Point, Point), (Cell, Cell)> {
    let mut map = BTreeMap::new();
    for &cell in cells {
        for side in sides(lattice, cell) {
            map.insert((side.from, side.to), (cell, side.neighbor));
            map.insert((side.to, side.from), (side.neighbor, cell));
        }
    }
    map
}
