use dimer_core::{Cell, TilingError};
use dimer_flow::neighborhood;
use dimer_graph::square_annulus;
use dimer_mcmc::{SamplerConfig, Session};

fn annulus_session() -> Session {
    Session::new(&square_annulus(6, 2), SamplerConfig::default()).unwrap()
}

fn raise_winding(session: &mut Session) -> (i32, Vec<Cell>) {
    let before = session.holes()[0].winding;
    match session.adjust_hole_winding(0, 1) {
        Ok(changed) => (before, changed),
        Err(TilingError::WindingUnreachable(_)) => {
            session.adjust_hole_winding(0, -1).unwrap();
            let lowered = session.holes()[0].winding;
            assert_eq!(lowered, before - 1);
            (lowered, session.adjust_hole_winding(0, 1).unwrap())
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn annulus_reports_one_hole() {
    let session = annulus_session();
    let holes = session.holes();
    assert_eq!(holes.len(), 1);
    assert_eq!(holes[0].cells.len(), 4);
    assert_eq!(holes[0].boundary.len(), 12);
    assert_eq!(session.diagnostics().windings, vec![holes[0].winding]);
}

#[test]
fn unit_change_stays_near_the_hole() {
    let mut session = annulus_session();
    let (before, changed) = raise_winding(&mut session);
    assert!(!changed.is_empty());

    let status = &session.holes()[0];
    assert_eq!(status.winding, before + 1);
    assert_eq!(session.diagnostics().windings, vec![before + 1]);
    session.configuration().validate(session.graph()).unwrap();

    let graph = session.graph();
    let boundary: Vec<_> = status
        .boundary
        .iter()
        .filter_map(|cell| graph.id_of(cell))
        .collect();
    let band = neighborhood(graph, &boundary, session.config().winding_band);
    for cell in &changed {
        let id = graph.id_of(cell).unwrap();
        assert!(band[id as usize], "{cell} changed outside the band");
    }
}

#[test]
fn winding_survives_face_flips() {
    let mut session = annulus_session();
    let winding = session.holes()[0].winding;
    session.step(5_000);
    session.sweep();
    assert_eq!(session.holes()[0].winding, winding);
}

#[test]
fn unreachable_change_leaves_state_untouched() {
    let mut session = annulus_session();
    let before = session.export_configuration();
    let err = session.adjust_hole_winding(0, 50).unwrap_err();
    assert!(matches!(err, TilingError::WindingUnreachable(_)));
    assert!(err.is_retriable());
    assert_eq!(session.export_configuration(), before);
}

#[test]
fn trivial_and_unknown_requests() {
    let mut session = annulus_session();
    assert!(session.adjust_hole_winding(0, 0).unwrap().is_empty());
    let err = session.adjust_hole_winding(3, 1).unwrap_err();
    assert!(matches!(err, TilingError::InvalidInput(_)));
    assert_eq!(err.info().code, "unknown-hole");
}

#[test]
fn windings_stay_within_cut_bounds() {
    let mut session = annulus_session();
    let start = session.holes()[0].clone();
    assert!(start.min_winding < start.max_winding);
    assert!((start.min_winding..=start.max_winding).contains(&start.winding));

    for delta in [1, -1, -1, 1] {
        let _ = session.adjust_hole_winding(0, delta);
        let status = &session.holes()[0];
        assert!((status.min_winding..=status.max_winding).contains(&status.winding));
    }

    let status = session.holes()[0].clone();
    let beyond = status.max_winding - status.winding + 1;
    let err = session.adjust_hole_winding(0, beyond).unwrap_err();
    assert!(matches!(err, TilingError::WindingUnreachable(_)));
    assert_eq!(session.holes()[0].winding, status.winding);
}
