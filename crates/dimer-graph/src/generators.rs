use dimer_core::{Cell, LatticeKind, Point};

use crate::lattice::vertices;
use crate::region::RegionSpec;

/// `width × height` rectangle of unit squares with its lower-left cell at the origin.
pub fn rectangle(width: i32, height: i32) -> RegionSpec {
    let cells = (0..width)
        .flat_map(|x| (0..height).map(move |y| Cell::square(x, y)))
        .collect();
    RegionSpec::new(LatticeKind::Square, cells)
}

/// Aztec diamond of order `order`: squares whose centres satisfy `|x| + |y| <= order`.
pub fn aztec_diamond(order: i32) -> RegionSpec {
    let cells = (-order..order)
        .flat_map(|x| (-order..order).map(move |y| (x, y)))
        .filter(|&(x, y)| (2 * x + 1).abs() + (2 * y + 1).abs() <= 2 * order)
        .map(|(x, y)| Cell::square(x, y))
        .collect();
    RegionSpec::new(LatticeKind::Square, cells)
}

/// Regular hexagon with `side` triangles per edge, centred on the origin.
pub fn hexagon(side: i32) -> RegionSpec {
    let inside = |point: Point| hex_distance(point) <= side;
    let cells = (-side - 1..=side + 1)
        .flat_map(|x| (-side - 1..=side + 1).flat_map(move |y| [Cell::black(x, y), Cell::white(x, y)]))
        .filter(|&cell| {
            vertices(LatticeKind::Triangular, cell)
                .into_iter()
                .all(inside)
        })
        .collect();
    RegionSpec::new(LatticeKind::Triangular, cells)
}

/// `outer × outer` square with a centred `inner × inner` hole.
pub fn square_annulus(outer: i32, inner: i32) -> RegionSpec {
    let margin = (outer - inner) / 2;
    let in_hole = |cell: &Cell| {
        (margin..margin + inner).contains(&cell.x) && (margin..margin + inner).contains(&cell.y)
    };
    let base = rectangle(outer, outer);
    let (holes, cells): (Vec<Cell>, Vec<Cell>) = base.cells.into_iter().partition(in_hole);
    RegionSpec::new(LatticeKind::Square, cells).with_holes(holes)
}

fn hex_distance(point: Point) -> i32 {
    (point.x.abs() + point.y.abs() + (point.x + point.y).abs()) / 2
}
