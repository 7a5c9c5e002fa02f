use std::collections::VecDeque;

use dimer_core::Color;
use dimer_graph::{CellId, DimerConfiguration, RegionGraph};

/// Cells within `radius` side-steps of `seeds`, as a membership mask.
pub fn neighborhood(graph: &RegionGraph, seeds: &[CellId], radius: usize) -> Vec<bool> {
    let mut distance = vec![usize::MAX; graph.len()];
    let mut queue = VecDeque::new();
    for &seed in seeds {
        if distance[seed as usize] == usize::MAX {
            distance[seed as usize] = 0;
            queue.push_back(seed);
        }
    }
    while let Some(cell) = queue.pop_front() {
        let next_distance = distance[cell as usize] + 1;
        if next_distance > radius {
            continue;
        }
        for &next in graph.neighbors(cell) {
            if distance[next as usize] == usize::MAX {
                distance[next as usize] = next_distance;
                queue.push_back(next);
            }
        }
    }
    distance.into_iter().map(|d| d != usize::MAX).collect()
}

/// Completes `config` with augmenting paths confined to `allowed` cells.
///
/// Dimers with an end outside `allowed` are never touched. Returns the cells
/// that are still unmatched afterwards; an empty result means the matching is
/// perfect.
pub fn augment_within(
    graph: &RegionGraph,
    config: &mut DimerConfiguration,
    allowed: &[bool],
) -> Vec<CellId> {
    let free: Vec<CellId> = config
        .unmatched()
        .filter(|&cell| allowed[cell as usize] && graph.cell(cell).color == Color::Black)
        .collect();
    for start in free {
        if let Some(path) = find_path(graph, config, allowed, start) {
            for pair in path.chunks(2).rev() {
                config.pair(pair[0], pair[1]);
            }
        }
    }
    config.unmatched().collect()
}

/// Alternating path `b0, w0, b1, w1, .., bk, wk` ending at a free white cell.
fn find_path(
    graph: &RegionGraph,
    config: &DimerConfiguration,
    allowed: &[bool],
    start: CellId,
) -> Option<Vec<CellId>> {
    let mut parent: Vec<Option<CellId>> = vec![None; graph.len()];
    let mut visited = vec![false; graph.len()];
    let mut queue = VecDeque::from([start]);
    visited[start as usize] = true;
    while let Some(black) = queue.pop_front() {
        for &white in graph.neighbors(black) {
            if !allowed[white as usize] || visited[white as usize] {
                continue;
            }
            visited[white as usize] = true;
            parent[white as usize] = Some(black);
            match config.mate(white) {
                None => return Some(unwind(&parent, config, white)),
                Some(next) if allowed[next as usize] && !visited[next as usize] => {
                    visited[next as usize] = true;
                    queue.push_back(next);
                }
                Some(_) => {}
            }
        }
    }
    None
}

fn unwind(parent: &[Option<CellId>], config: &DimerConfiguration, end: CellId) -> Vec<CellId> {
    let mut path = Vec::new();
    let mut white = Some(end);
    while let Some(current) = white {
        let Some(black) = parent[current as usize] else {
            break;
        };
        path.push(current);
        path.push(black);
        white = config.mate(black);
    }
    path.reverse();
    path
}
