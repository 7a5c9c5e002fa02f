use std::collections::{BTreeMap, BTreeSet, VecDeque};

use dimer_core::{Cell, Color, LatticeKind, Point};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lattice::{cells_around, side_map, sides, vertices};
use crate::matching::DimerConfiguration;
use crate::region::CellId;

/// A region side crossed by a hole's cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutCrossing {
    /// Black cell on one side of the cut.
    pub black: CellId,
    /// White cell on the other side.
    pub white: CellId,
    /// `+1` when the black cell lies left of the cut direction, `-1` otherwise.
    pub sign: i32,
}

/// A maximal excluded component enclosed by the region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    /// Position of the hole in [`crate::RegionGraph::holes`].
    pub id: usize,
    /// Excluded lattice cells forming the hole.
    pub cells: Vec<Cell>,
    /// Region cells touching the hole.
    pub boundary: Vec<CellId>,
    /// Lattice path from the hole to the outer boundary.
    pub cut_path: Vec<Point>,
    /// Region sides along `cut_path` that a dimer can cover.
    pub cut: Vec<CutCrossing>,
}

impl Hole {
    /// Signed number of dimers crossing the cut.
    pub fn winding(&self, config: &DimerConfiguration) -> i32 {
        self.cut
            .iter()
            .filter(|crossing| config.mate(crossing.black) == Some(crossing.white))
            .map(|crossing| crossing.sign)
            .sum()
    }

    /// Dimers on the cut that currently carry the winding.
    pub fn realizing(&self, config: &DimerConfiguration) -> Vec<(CellId, CellId)> {
        self.cut
            .iter()
            .filter(|crossing| config.mate(crossing.black) == Some(crossing.white))
            .map(|crossing| (crossing.black, crossing.white))
            .collect()
    }

    /// Lowest and highest winding the cut admits.
    ///
    /// Dimers covering the cut at the same time are cell-disjoint, so each
    /// bound is the largest cell-disjoint set of crossings of one sign.
    pub fn winding_bounds(&self) -> (i32, i32) {
        (
            -disjoint_crossings(&self.cut, -1),
            disjoint_crossings(&self.cut, 1),
        )
    }
}

fn disjoint_crossings(cut: &[CutCrossing], sign: i32) -> i32 {
    let edges: Vec<(CellId, CellId)> = cut
        .iter()
        .filter(|crossing| crossing.sign == sign)
        .map(|crossing| (crossing.black, crossing.white))
        .collect();
    let blacks: BTreeSet<CellId> = edges.iter().map(|&(black, _)| black).collect();
    let mut owner: BTreeMap<CellId, CellId> = BTreeMap::new();
    let mut matched = 0;
    for black in blacks {
        let mut visited = BTreeSet::new();
        if augment_crossing(black, &edges, &mut owner, &mut visited) {
            matched += 1;
        }
    }
    matched
}

fn augment_crossing(
    black: CellId,
    edges: &[(CellId, CellId)],
    owner: &mut BTreeMap<CellId, CellId>,
    visited: &mut BTreeSet<CellId>,
) -> bool {
    for &(_, white) in edges.iter().filter(|&&(from, _)| from == black) {
        if !visited.insert(white) {
            continue;
        }
        let free = match owner.get(&white).copied() {
            None => true,
            Some(other) => augment_crossing(other, edges, owner, visited),
        };
        if free {
            owner.insert(white, black);
            return true;
        }
    }
    false
}

fn touching(lattice: LatticeKind, cell: Cell) -> impl Iterator<Item = Cell> {
    vertices(lattice, cell)
        .into_iter()
        .flat_map(move |point| cells_around(lattice, point))
}

/// Finds enclosed components of the complement and builds their cuts.
///
/// Only excluded cells touching the region are visited up front. They group
/// into rings, one per stretch of region boundary; a ring whose boundary runs
/// clockwise around it lines a hole, which is then filled from the ring inward.
pub(crate) fn locate_holes(lattice: LatticeKind, region: &IndexSet<Cell>) -> Vec<Hole> {
    let rim: BTreeSet<Cell> = region
        .iter()
        .flat_map(|&cell| touching(lattice, cell))
        .filter(|cell| !region.contains(cell))
        .collect();

    let mut seen = BTreeSet::new();
    let mut rings = Vec::new();
    let mut components = Vec::new();
    for &start in &rim {
        if seen.contains(&start) {
            continue;
        }
        let Some(ring) = flood(lattice, [start], |cell| rim.contains(cell), &mut seen, usize::MAX)
        else {
            continue;
        };
        let area = enclosed_area(lattice, region, &ring);
        if area >= 0 {
            rings.push(ring);
            continue;
        }
        let limit = usize::try_from(area.unsigned_abs()).unwrap_or(usize::MAX);
        let mut filled = BTreeSet::new();
        match flood(
            lattice,
            ring.iter().copied(),
            |cell| !region.contains(cell),
            &mut filled,
            limit,
        ) {
            Some(component) => components.push(component),
            None => warn!(start = %start, "clockwise boundary does not enclose a bounded hole"),
        }
    }
    if components.is_empty() {
        return Vec::new();
    }
    components.sort_by(|a, b| a.first().cmp(&b.first()));

    let enclosed: BTreeSet<Cell> = components.iter().flatten().copied().collect();
    let exterior: Vec<Cell> = rings
        .iter()
        .filter(|ring| !ring.iter().any(|cell| enclosed.contains(cell)))
        .flatten()
        .copied()
        .collect();

    let touches_region = |point: &Point| {
        cells_around(lattice, *point)
            .iter()
            .any(|cell| region.contains(cell))
    };
    let outer_points: BTreeSet<Point> = exterior
        .iter()
        .flat_map(|&cell| vertices(lattice, cell))
        .filter(|point| touches_region(point))
        .collect();
    let hole_points: Vec<BTreeSet<Point>> = components
        .iter()
        .map(|component| {
            component
                .iter()
                .flat_map(|&cell| vertices(lattice, cell))
                .filter(|point| touches_region(point))
                .collect()
        })
        .collect();

    let owners = side_map(lattice, region.iter());
    let mut graph: BTreeMap<Point, Vec<Point>> = BTreeMap::new();
    for &(from, to) in owners.keys() {
        graph.entry(from).or_default().push(to);
    }

    components
        .into_iter()
        .enumerate()
        .map(|(id, component)| {
            let boundary: BTreeSet<CellId> = component
                .iter()
                .flat_map(|&cell| touching(lattice, cell))
                .filter_map(|cell| region.get_index_of(&cell))
                .map(|idx| idx as CellId)
                .collect();
            let others: BTreeSet<Point> = hole_points
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != id)
                .flat_map(|(_, points)| points.iter().copied())
                .collect();
            let cut_path = shortest_cut(&graph, &hole_points[id], &outer_points, &others)
                .or_else(|| {
                    shortest_cut(&graph, &hole_points[id], &outer_points, &BTreeSet::new())
                })
                .unwrap_or_default();
            if cut_path.is_empty() {
                warn!(hole = id, "no cut found from hole to outer boundary");
            }
            let cut = cut_path
                .windows(2)
                .filter_map(|step| {
                    let &(left, right) = owners.get(&(step[0], step[1]))?;
                    let left_id = region.get_index_of(&left)? as CellId;
                    let right_id = region.get_index_of(&right)? as CellId;
                    Some(match left.color {
                        Color::Black => CutCrossing {
                            black: left_id,
                            white: right_id,
                            sign: 1,
                        },
                        Color::White => CutCrossing {
                            black: right_id,
                            white: left_id,
                            sign: -1,
                        },
                    })
                })
                .collect();
            Hole {
                id,
                cells: component.into_iter().collect(),
                boundary: boundary.into_iter().collect(),
                cut_path,
                cut,
            }
        })
        .collect()
}

fn flood(
    lattice: LatticeKind,
    seeds: impl IntoIterator<Item = Cell>,
    admit: impl Fn(&Cell) -> bool,
    seen: &mut BTreeSet<Cell>,
    limit: usize,
) -> Option<BTreeSet<Cell>> {
    let mut component = BTreeSet::new();
    let mut queue: VecDeque<Cell> = VecDeque::new();
    for seed in seeds {
        if seen.insert(seed) {
            queue.push_back(seed);
        }
    }
    while let Some(cell) = queue.pop_front() {
        component.insert(cell);
        if component.len() > limit {
            return None;
        }
        for next in touching(lattice, cell) {
            if admit(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    Some(component)
}

/// Twice the signed area enclosed by the region boundary lining `ring`.
///
/// Boundary sides are taken with the region on their left, so outer
/// boundaries come out positive and hole boundaries negative.
fn enclosed_area(lattice: LatticeKind, region: &IndexSet<Cell>, ring: &BTreeSet<Cell>) -> i128 {
    ring.iter()
        .flat_map(|&cell| sides(lattice, cell))
        .filter(|side| region.contains(&side.neighbor))
        .map(|side| cross(side.to, side.from))
        .sum()
}

fn cross(a: Point, b: Point) -> i128 {
    i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y)
}

fn shortest_cut(
    graph: &BTreeMap<Point, Vec<Point>>,
    sources: &BTreeSet<Point>,
    targets: &BTreeSet<Point>,
    blocked: &BTreeSet<Point>,
) -> Option<Vec<Point>> {
    let mut parent: BTreeMap<Point, Option<Point>> = BTreeMap::new();
    let mut queue = VecDeque::new();
    for &source in sources {
        parent.insert(source, None);
        queue.push_back(source);
    }
    while let Some(point) = queue.pop_front() {
        if targets.contains(&point) {
            let mut path = vec![point];
            let mut cursor = point;
            while let Some(Some(prev)) = parent.get(&cursor) {
                path.push(*prev);
                cursor = *prev;
            }
            path.reverse();
            return Some(path);
        }
        for &next in graph.get(&point).map(Vec::as_slice).unwrap_or_default() {
            if blocked.contains(&next) || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, Some(point));
            queue.push_back(next);
        }
    }
    None
}
