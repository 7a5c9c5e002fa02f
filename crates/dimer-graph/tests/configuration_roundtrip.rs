use dimer_core::{Cell, Dimer, TilingError};
use dimer_graph::{
    configuration_hash, heights, rectangle, square_annulus, DimerConfiguration, FaceState,
    RegionGraph,
};

fn horizontal_tiling(graph: &RegionGraph) -> Vec<Dimer> {
    graph
        .cells()
        .filter(|cell| cell.x % 2 == 0)
        .map(|&cell| {
            let right = Cell::square(cell.x + 1, cell.y);
            if cell.color == dimer_core::Color::Black {
                Dimer { black: cell, white: right }
            } else {
                Dimer { black: right, white: cell }
            }
        })
        .collect()
}

#[test]
fn export_import_roundtrip() {
    let graph = RegionGraph::build(&rectangle(4, 4)).unwrap();
    let config = DimerConfiguration::from_dimers(&graph, &horizontal_tiling(&graph)).unwrap();
    assert!(config.is_perfect());
    let exported = config.dimers(&graph);
    assert_eq!(exported.len(), 8);
    let back = DimerConfiguration::from_dimers(&graph, &exported).unwrap();
    assert_eq!(back, config);
    assert_eq!(
        configuration_hash(&graph, &back),
        configuration_hash(&graph, &config)
    );
}

#[test]
fn import_rejects_bad_lists() {
    let graph = RegionGraph::build(&rectangle(2, 2)).unwrap();
    let mut dimers = horizontal_tiling(&graph);
    dimers.pop();
    let err = DimerConfiguration::from_dimers(&graph, &dimers).unwrap_err();
    assert_eq!(err.info().code, "uncovered-cell");

    let diagonal = vec![Dimer {
        black: Cell::square(0, 0),
        white: Cell::square(1, 2),
    }];
    let err = DimerConfiguration::from_dimers(&graph, &diagonal).unwrap_err();
    assert!(matches!(err, TilingError::InvalidInput(_)));
    assert_eq!(err.info().code, "unknown-cell");

    let doubled = vec![
        Dimer {
            black: Cell::square(0, 0),
            white: Cell::square(1, 0),
        },
        Dimer {
            black: Cell::square(0, 0),
            white: Cell::square(0, 1),
        },
    ];
    assert_eq!(
        DimerConfiguration::from_dimers(&graph, &doubled)
            .unwrap_err()
            .info()
            .code,
        "double-matched"
    );
}

#[test]
fn face_flip_cycles_between_two_tilings() {
    let graph = RegionGraph::build(&rectangle(2, 2)).unwrap();
    let face = graph.face(0).clone();
    let mut config = DimerConfiguration::from_dimers(&graph, &horizontal_tiling(&graph)).unwrap();
    let start = config.face_state(&face);
    assert_ne!(start, FaceState::Frozen);
    let other = if start == FaceState::Up {
        FaceState::Down
    } else {
        FaceState::Up
    };
    config.set_face(&face, other);
    assert_eq!(config.face_state(&face), other);
    config.validate(&graph).unwrap();
    assert_eq!(config.gap(&DimerConfiguration::from_dimers(&graph, &horizontal_tiling(&graph)).unwrap()), 4);
}

#[test]
fn horizontal_annulus_tiling_has_zero_winding() {
    let graph = RegionGraph::build(&square_annulus(6, 2)).unwrap();
    let config = DimerConfiguration::from_dimers(&graph, &horizontal_tiling(&graph)).unwrap();
    let hole = &graph.holes()[0];
    assert_eq!(hole.winding(&config), 0);
    assert!(hole.realizing(&config).is_empty());
    let map = heights(&graph, &config);
    assert_eq!(map.len(), 7 * 7 - 1);
}
