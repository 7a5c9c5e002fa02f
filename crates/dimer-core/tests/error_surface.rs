use dimer_core::errors::{ErrorInfo, TilingError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("cell", "B(0,0)")
        .with_context("black", 3)
}

#[test]
fn infeasible_region_surface() {
    let err = TilingError::InfeasibleRegion(sample_info("color-imbalance", "counts differ"));
    assert_eq!(err.info().code, "color-imbalance");
    assert_eq!(err.info().context.get("black").map(String::as_str), Some("3"));
    assert!(!err.is_retriable());
}

#[test]
fn local_failures_are_retriable() {
    let winding = TilingError::WindingUnreachable(sample_info("no-cycle", "no rerouting"));
    let repair = TilingError::RepairImpossible(sample_info("parity", "parity changed"));
    let budget = TilingError::EpochBudgetExceeded(sample_info("budget", "24 epochs"));
    let cancelled = TilingError::Cancelled(sample_info("cancelled", "stop"));
    for err in [winding, repair, budget, cancelled] {
        assert!(err.is_retriable(), "{err}");
    }
}

#[test]
fn invalid_input_is_fatal() {
    let err = TilingError::invalid("bad-bias", "negative weight");
    assert_eq!(err.info().code, "bad-bias");
    assert!(!err.is_retriable());
}

#[test]
fn display_includes_context_and_hint() {
    let err = TilingError::RepairImpossible(
        sample_info("parity", "parity changed").with_hint("reinitialize the region"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("cell=B(0,0)"));
    assert!(rendered.contains("hint: reinitialize the region"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = TilingError::EpochBudgetExceeded(
        ErrorInfo::new("epoch-budget", "no coalescence")
            .with_context("epochs", 4)
            .with_context("gap", 12),
    );
    let json = serde_json::to_string(&err).unwrap();
    let back: TilingError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, back);
}
