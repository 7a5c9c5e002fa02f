use dimer_core::{Cell, TilingError};
use dimer_graph::{rectangle, square_annulus};
use dimer_mcmc::{RegionEdit, SamplerConfig, Session, TopologyTracker};

fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[test]
fn removing_a_domino_repairs_locally() {
    let mut session = Session::new(&rectangle(6, 6), SamplerConfig::default()).unwrap();
    session.step(2_000);
    let radius = session.config().repair_radius as i32;
    let removed = [Cell::square(0, 0), Cell::square(1, 0)];
    let changed = session
        .repair_region(&removed.map(RegionEdit::Removed))
        .unwrap();

    assert_eq!(session.graph().len(), 34);
    session.configuration().validate(session.graph()).unwrap();
    for cell in &changed {
        let nearest = removed.iter().map(|&r| manhattan(*cell, r)).min().unwrap();
        assert!(nearest <= radius + 1, "{cell} changed far from the edit");
    }

    let restored = session
        .repair_region(&removed.map(RegionEdit::Added))
        .unwrap();
    assert!(restored.contains(&removed[0]));
    assert_eq!(session.graph().len(), 36);
    session.configuration().validate(session.graph()).unwrap();
}

#[test]
fn untouched_dimers_survive() {
    let mut session = Session::new(&rectangle(8, 4), SamplerConfig::default()).unwrap();
    let before = session.export_configuration();
    let removed = [Cell::square(7, 3), Cell::square(7, 2)];
    let changed = session
        .repair_region(&removed.map(RegionEdit::Removed))
        .unwrap();
    let after = session.export_configuration();
    for dimer in before {
        let touched = [dimer.black, dimer.white]
            .iter()
            .any(|cell| removed.contains(cell) || changed.contains(cell));
        if !touched {
            assert!(after.contains(&dimer), "{dimer:?} was lost");
        }
    }
}

#[test]
fn imbalanced_edit_is_reported_and_rolled_back() {
    let mut session = Session::new(&rectangle(4, 4), SamplerConfig::default()).unwrap();
    let before = session.export_configuration();
    let err = session
        .repair_region(&[RegionEdit::Removed(Cell::square(0, 0))])
        .unwrap_err();
    assert!(matches!(err, TilingError::RepairImpossible(_)));
    assert!(err.is_retriable());
    assert!(err.info().hint.is_some());
    assert_eq!(session.graph().len(), 16);
    assert_eq!(session.export_configuration(), before);
}

#[test]
fn no_op_edits_are_rejected() {
    let mut session = Session::new(&rectangle(4, 2), SamplerConfig::default()).unwrap();
    let err = session
        .repair_region(&[RegionEdit::Added(Cell::square(0, 0))])
        .unwrap_err();
    assert_eq!(err.info().code, "noop-edit");
    let err = session
        .repair_region(&[RegionEdit::Removed(Cell::square(9, 9))])
        .unwrap_err();
    assert_eq!(err.info().code, "noop-edit");
}

#[test]
fn carving_a_hole_refreshes_windings_after_commit() {
    let mut session = Session::new(&rectangle(6, 6), SamplerConfig::default()).unwrap();
    assert!(session.diagnostics().windings.is_empty());
    let gap = [
        Cell::square(2, 2),
        Cell::square(3, 2),
        Cell::square(2, 3),
        Cell::square(3, 3),
    ];
    session.repair_region(&gap.map(RegionEdit::Removed)).unwrap();
    let holes = session.holes();
    assert_eq!(holes.len(), 1);
    assert_eq!(session.diagnostics().windings, vec![holes[0].winding]);
}

#[test]
fn tracker_repair_leaves_cached_windings_to_the_caller() {
    let session = Session::new(&square_annulus(6, 2), SamplerConfig::default()).unwrap();
    let mut tracker = TopologyTracker::new(2, 4);
    tracker.refresh(session.graph(), session.configuration());
    let before = tracker.windings().to_vec();
    assert_eq!(before.len(), 1);

    let fill = [
        Cell::square(2, 2),
        Cell::square(3, 2),
        Cell::square(2, 3),
        Cell::square(3, 3),
    ];
    let outcome = tracker
        .repair_region(session.graph(), session.configuration(), &fill.map(RegionEdit::Added))
        .unwrap();
    assert!(outcome.graph.holes().is_empty());
    assert_eq!(tracker.windings(), before.as_slice());

    tracker.refresh(&outcome.graph, &outcome.configuration);
    assert!(tracker.windings().is_empty());
}
