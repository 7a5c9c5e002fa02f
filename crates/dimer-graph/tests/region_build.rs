use dimer_core::{Cell, LatticeKind, Point, TilingError};
use dimer_graph::{
    aztec_diamond, canonical_hash, hexagon, rectangle, square_annulus, RegionGraph, RegionSpec,
};

#[test]
fn rectangle_counts_and_faces() {
    let graph = RegionGraph::build(&rectangle(4, 3)).unwrap();
    assert_eq!(graph.len(), 12);
    assert_eq!(graph.blacks().len(), 6);
    assert_eq!(graph.whites().len(), 6);
    assert_eq!(graph.faces().len(), 6);
    assert!(graph.holes().is_empty());
    for &black in graph.blacks() {
        for &white in graph.neighbors(black) {
            assert!(graph.neighbors(white).contains(&black));
        }
    }
}

#[test]
fn hexagon_has_interior_faces() {
    let small = RegionGraph::build(&hexagon(1)).unwrap();
    assert_eq!(small.faces().len(), 1);
    assert_eq!(small.face(0).center, Point::new(0, 0));

    let graph = RegionGraph::build(&hexagon(2)).unwrap();
    assert_eq!(graph.len(), 24);
    assert_eq!(graph.faces().len(), 7);
    for face in graph.faces() {
        assert_eq!(face.cells.len(), 6);
    }
}

#[test]
fn aztec_diamond_is_balanced() {
    let graph = RegionGraph::build(&aztec_diamond(3)).unwrap();
    assert_eq!(graph.len(), 24);
    assert_eq!(graph.blacks().len(), graph.whites().len());
}

#[test]
fn batches_partition_faces_without_shared_cells() {
    for spec in [rectangle(6, 5), hexagon(3), aztec_diamond(4)] {
        let graph = RegionGraph::build(&spec).unwrap();
        let mut covered = vec![0usize; graph.faces().len()];
        for batch in graph.batches() {
            let mut used = vec![false; graph.len()];
            for &face in batch {
                covered[face] += 1;
                for &cell in &graph.face(face).cells {
                    assert!(!used[cell as usize], "cell shared inside a batch");
                    used[cell as usize] = true;
                }
            }
        }
        assert!(covered.iter().all(|&count| count == 1));
    }
}

#[test]
fn imbalance_is_infeasible() {
    let err = RegionGraph::build(&rectangle(3, 3)).unwrap_err();
    assert!(matches!(err, TilingError::InfeasibleRegion(_)));
    assert_eq!(err.info().code, "color-imbalance");
    assert_eq!(err.info().context.get("black").map(String::as_str), Some("5"));
    assert!(!err.is_retriable());
}

#[test]
fn empty_and_isolated_regions_fail_fast() {
    let empty = RegionSpec::new(LatticeKind::Square, Vec::new());
    assert_eq!(RegionGraph::build(&empty).unwrap_err().info().code, "empty-region");

    let isolated = RegionSpec::new(
        LatticeKind::Square,
        vec![Cell::square(0, 0), Cell::square(5, 0)],
    );
    let err = RegionGraph::build(&isolated).unwrap_err();
    assert_eq!(err.info().code, "isolated-cell");
    assert_eq!(err.info().context.get("cell").map(String::as_str), Some("B(0,0)"));
}

#[test]
fn wrong_square_colour_is_invalid() {
    let spec = RegionSpec::new(LatticeKind::Square, vec![Cell::white(0, 0), Cell::square(1, 0)]);
    let err = RegionGraph::build(&spec).unwrap_err();
    assert!(matches!(err, TilingError::InvalidInput(_)));
}

#[test]
fn annulus_hole_is_detected_with_cut() {
    let graph = RegionGraph::build(&square_annulus(6, 2)).unwrap();
    assert_eq!(graph.holes().len(), 1);
    let hole = &graph.holes()[0];
    assert_eq!(hole.cells.len(), 4);
    assert_eq!(hole.boundary.len(), 12);
    assert!(hole.cut_path.len() >= 2);
    assert!(!hole.cut.is_empty());
    for crossing in &hole.cut {
        assert!(graph.are_adjacent(crossing.black, crossing.white));
        assert!(crossing.sign == 1 || crossing.sign == -1);
    }
    let end = hole.cut_path[hole.cut_path.len() - 1];
    assert!(end.x == 0 || end.y == 0 || end.x == 6 || end.y == 6);
}

#[test]
fn enclosed_gap_becomes_hole_without_listing() {
    let mut spec = rectangle(6, 6);
    spec.cells
        .retain(|cell| !((2..4).contains(&cell.x) && (2..4).contains(&cell.y)));
    let graph = RegionGraph::build(&spec).unwrap();
    assert_eq!(graph.holes().len(), 1);
    assert_eq!(graph.spec().holes, Vec::<Cell>::new());
}

#[test]
fn notch_on_the_border_is_not_a_hole() {
    let mut spec = rectangle(4, 4);
    spec.holes = vec![Cell::square(0, 0), Cell::square(1, 0)];
    let graph = RegionGraph::build(&spec).unwrap();
    assert!(graph.holes().is_empty());
    assert_eq!(graph.len(), 14);
}

#[test]
fn hash_is_stable_and_sensitive() {
    let a = RegionGraph::build(&rectangle(4, 4)).unwrap();
    let b = RegionGraph::build(&a.spec()).unwrap();
    let c = RegionGraph::build(&rectangle(2, 8)).unwrap();
    assert_eq!(canonical_hash(&a), canonical_hash(&b));
    assert_ne!(canonical_hash(&a), canonical_hash(&c));
}

#[test]
fn spec_roundtrips_through_json() {
    let spec = square_annulus(6, 2);
    let json = serde_json::to_string(&spec).unwrap();
    let back: RegionSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(spec, back);
}

#[test]
fn distant_components_build_without_scanning_the_gap() {
    let spec = RegionSpec::new(
        LatticeKind::Square,
        vec![
            Cell::square(i32::MIN + 2, i32::MIN + 2),
            Cell::square(i32::MIN + 3, i32::MIN + 2),
            Cell::square(i32::MAX - 3, i32::MAX - 2),
            Cell::square(i32::MAX - 2, i32::MAX - 2),
        ],
    );
    let graph = RegionGraph::build(&spec).unwrap();
    assert_eq!(graph.len(), 4);
    assert!(graph.holes().is_empty());
    assert!(graph.faces().is_empty());
}

#[test]
fn coordinates_at_the_integer_limit_are_invalid() {
    let spec = RegionSpec::new(
        LatticeKind::Square,
        vec![Cell::square(i32::MAX - 1, 0), Cell::square(i32::MAX, 0)],
    );
    let err = RegionGraph::build(&spec).unwrap_err();
    assert!(matches!(err, TilingError::InvalidInput(_)));
    assert_eq!(err.info().code, "coordinate-range");
    assert!(err.info().context.contains_key("cell"));
}

#[test]
fn island_inside_a_hole_belongs_to_that_hole() {
    let mut spec = rectangle(8, 8);
    spec.cells.retain(|cell| {
        let in_gap = (2..6).contains(&cell.x) && (2..6).contains(&cell.y);
        let on_island = (3..5).contains(&cell.x) && (3..5).contains(&cell.y);
        !in_gap || on_island
    });
    let graph = RegionGraph::build(&spec).unwrap();
    assert_eq!(graph.len(), 52);
    assert_eq!(graph.holes().len(), 1);
    let hole = &graph.holes()[0];
    assert_eq!(hole.cells.len(), 12);
    assert_eq!(hole.boundary.len(), 24);
    assert!(!hole.cut.is_empty());
    let end = hole.cut_path[hole.cut_path.len() - 1];
    assert!(end.x == 0 || end.y == 0 || end.x == 8 || end.y == 8);
}

#[test]
fn triangular_hole_is_found_from_its_boundary() {
    let mut spec = hexagon(3);
    let inner: Vec<Cell> = hexagon(1).cells;
    spec.cells.retain(|cell| !inner.contains(cell));
    let graph = RegionGraph::build(&spec).unwrap();
    assert_eq!(graph.holes().len(), 1);
    assert_eq!(graph.holes()[0].cells.len(), 6);
}

#[test]
fn explicit_holes_change_the_hash() {
    let plain = RegionGraph::build(&rectangle(4, 4)).unwrap();
    let listed =
        RegionGraph::build(&rectangle(4, 4).with_holes(vec![Cell::square(9, 9), Cell::square(9, 10)]))
            .unwrap();
    assert_eq!(plain.len(), listed.len());
    assert_ne!(plain.spec(), listed.spec());
    assert_ne!(canonical_hash(&plain), canonical_hash(&listed));
}

#[test]
fn winding_bounds_cover_the_cut() {
    let graph = RegionGraph::build(&square_annulus(6, 2)).unwrap();
    let hole = &graph.holes()[0];
    let (low, high) = hole.winding_bounds();
    assert!(low <= 0 && 0 <= high);
    assert!(low < high);
    let positive = hole.cut.iter().filter(|crossing| crossing.sign == 1).count() as i32;
    let negative = hole.cut.iter().filter(|crossing| crossing.sign == -1).count() as i32;
    assert!(high <= positive);
    assert!(-low <= negative);
}
