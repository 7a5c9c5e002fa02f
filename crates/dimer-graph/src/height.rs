//! Height function of a dimer configuration on the lattice points of a region.
//!
//! Walking along a side with the black cell on the left adds `+1` when no dimer
//! covers the side and `-(k - 1)` when one does, `k` being the number of sides
//! per cell. Heights are propagated along a breadth-first spanning tree of the
//! region's lattice points that depends only on the geometry, so two
//! configurations of the same region are always measured against the same base
//! point and the same tree. Around a hole the tree acts as a branch cut.

use std::collections::{BTreeMap, VecDeque};

use dimer_core::{Cell, Color, LatticeKind, Point};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::lattice::side_map;
use crate::matching::DimerConfiguration;
use crate::region::{CellId, RegionGraph};

#[derive(Debug, Clone)]
struct HeightStep {
    point: Point,
    parent: Option<usize>,
    left_black: bool,
    side: Option<(CellId, CellId)>,
}

/// Spanning tree used to integrate heights.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeightTree {
    steps: Vec<HeightStep>,
}

impl HeightTree {
    pub(crate) fn build(lattice: LatticeKind, cells: &IndexSet<Cell>) -> Self {
        let mut edges: BTreeMap<Point, Vec<(Point, Cell, Cell)>> = BTreeMap::new();
        for (&(from, to), &(left, right)) in &side_map(lattice, cells.iter()) {
            edges.entry(from).or_default().push((to, left, right));
        }
        let id = |cell: &Cell| cells.get_index_of(cell).map(|idx| idx as CellId);

        let mut index: BTreeMap<Point, usize> = BTreeMap::new();
        let mut steps = Vec::with_capacity(edges.len());
        for &root in edges.keys() {
            if index.contains_key(&root) {
                continue;
            }
            index.insert(root, steps.len());
            steps.push(HeightStep {
                point: root,
                parent: None,
                left_black: true,
                side: None,
            });
            let mut queue = VecDeque::from([root]);
            while let Some(point) = queue.pop_front() {
                let parent = index[&point];
                for &(next, left, right) in edges.get(&point).map(Vec::as_slice).unwrap_or_default()
                {
                    if index.contains_key(&next) {
                        continue;
                    }
                    index.insert(next, steps.len());
                    steps.push(HeightStep {
                        point: next,
                        parent: Some(parent),
                        left_black: left.color == Color::Black,
                        side: id(&left).zip(id(&right)),
                    });
                    queue.push_back(next);
                }
            }
        }
        Self { steps }
    }
}

/// Heights of every lattice point touched by the region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMap {
    values: BTreeMap<Point, i32>,
}

impl HeightMap {
    /// Height at `point`.
    pub fn get(&self, point: Point) -> Option<i32> {
        self.values.get(&point).copied()
    }

    /// Points and heights in lattice order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, i32)> + '_ {
        self.values.iter().map(|(&point, &height)| (point, height))
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every height is at most the corresponding height of `other`.
    pub fn dominated_by(&self, other: &HeightMap) -> bool {
        self.values
            .iter()
            .all(|(point, height)| other.values.get(point).map_or(false, |h| height <= h))
    }
}

/// Computes the height function of `config`.
pub fn heights(graph: &RegionGraph, config: &DimerConfiguration) -> HeightMap {
    let covered_step = -(graph.lattice().sides() as i32 - 1);
    let steps = &graph.height_tree().steps;
    let mut raw = vec![0i32; steps.len()];
    for (idx, step) in steps.iter().enumerate() {
        if let Some(parent) = step.parent {
            let covered = step
                .side
                .map_or(false, |(left, right)| config.mate(left) == Some(right));
            let delta = if covered { covered_step } else { 1 };
            raw[idx] = raw[parent] + if step.left_black { delta } else { -delta };
        }
    }
    HeightMap {
        values: steps
            .iter()
            .zip(raw)
            .map(|(step, height)| (step.point, height))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::FaceState;
    use crate::generators::rectangle;

    #[test]
    fn up_flip_raises_center_by_cell_sides() {
        let graph = RegionGraph::build(&rectangle(2, 2)).unwrap();
        let face = graph.face(0).clone();
        let mut config = DimerConfiguration::empty(&graph);
        config.set_face(&face, FaceState::Down);
        let low = heights(&graph, &config);
        config.set_face(&face, FaceState::Up);
        let high = heights(&graph, &config);
        assert_eq!(
            high.get(face.center).unwrap() - low.get(face.center).unwrap(),
            4
        );
        for (point, height) in low.iter() {
            if point != face.center {
                assert_eq!(high.get(point), Some(height));
            }
        }
        assert!(low.dominated_by(&high));
    }
}
