use std::collections::BTreeSet;
use std::sync::Arc;

use dimer_core::{NoopMonitor, TilingError};
use dimer_graph::{aztec_diamond, configuration_hash, rectangle, RegionGraph};
use dimer_mcmc::{CftpCoupler, CftpOptions, CftpState, Coupling, FaceWeights, SamplerConfig, SamplingMode, Session};

fn coupler(graph: &Arc<RegionGraph>, options: CftpOptions) -> CftpCoupler {
    let weights = Arc::new(FaceWeights::uniform(graph));
    CftpCoupler::for_region(Arc::clone(graph), weights, options, &NoopMonitor).unwrap()
}

#[test]
fn same_seed_same_sample() {
    let graph = Arc::new(RegionGraph::build(&aztec_diamond(3)).unwrap());
    let options = CftpOptions {
        master_seed: 99,
        ..CftpOptions::default()
    };
    let first = coupler(&graph, options).run_until_exact(&NoopMonitor).unwrap();
    let second = coupler(&graph, options).run_until_exact(&NoopMonitor).unwrap();
    assert_eq!(first, second);
    first.configuration.validate(&graph).unwrap();
}

#[test]
fn seeds_select_different_samples() {
    let graph = Arc::new(RegionGraph::build(&rectangle(4, 4)).unwrap());
    let hashes: BTreeSet<String> = (0..8)
        .map(|seed| {
            let options = CftpOptions {
                master_seed: seed,
                ..CftpOptions::default()
            };
            let sample = coupler(&graph, options).run_until_exact(&NoopMonitor).unwrap();
            configuration_hash(&graph, &sample.configuration)
        })
        .collect();
    assert!(hashes.len() > 1);
}

#[test]
fn parallel_coupling_ignores_thread_count() {
    let graph = Arc::new(RegionGraph::build(&aztec_diamond(4)).unwrap());
    let samples: Vec<_> = [1, 2, 4]
        .into_iter()
        .map(|threads| {
            let options = CftpOptions {
                master_seed: 7,
                coupling: Coupling::Parallel,
                threads,
                ..CftpOptions::default()
            };
            coupler(&graph, options).run_until_exact(&NoopMonitor).unwrap()
        })
        .collect();
    assert_eq!(samples[0], samples[1]);
    assert_eq!(samples[1], samples[2]);
}

#[test]
fn spent_budget_resumes_where_it_stopped() {
    let graph = Arc::new(RegionGraph::build(&rectangle(6, 6)).unwrap());
    let patient = CftpOptions {
        master_seed: 21,
        max_epochs: 64,
        initial_block: 1,
        ..CftpOptions::default()
    };
    let reference = coupler(&graph, patient).run_until_exact(&NoopMonitor).unwrap();

    let mut hurried = coupler(
        &graph,
        CftpOptions {
            max_epochs: 1,
            ..patient
        },
    );
    let err = hurried.run_until_exact(&NoopMonitor).unwrap_err();
    assert!(matches!(err, TilingError::EpochBudgetExceeded(_)));
    assert!(err.is_retriable());
    assert_eq!(err.info().context.get("epochs").map(String::as_str), Some("1"));
    assert!(err.info().context.contains_key("gap"));
    assert_eq!(hurried.state(), CftpState::DoublingEpoch);
    assert_eq!(hurried.epochs(), 1);

    let mut calls = 1;
    let sample = loop {
        calls += 1;
        match hurried.run_until_exact(&NoopMonitor) {
            Ok(sample) => break sample,
            Err(TilingError::EpochBudgetExceeded(_)) => assert!(calls < 64),
            Err(other) => panic!("unexpected error: {other}"),
        }
    };
    assert_eq!(sample, reference);
    assert_eq!(hurried.state(), CftpState::Coalesced);
    assert_eq!(hurried.samples_taken(), 1);
    assert!(hurried.blocks().is_empty());
}

#[test]
fn window_doubles_each_epoch() {
    let graph = Arc::new(RegionGraph::build(&rectangle(6, 6)).unwrap());
    let mut coupling = coupler(
        &graph,
        CftpOptions {
            initial_block: 3,
            ..CftpOptions::default()
        },
    );
    assert_eq!(coupling.state(), CftpState::Idle);
    let first = coupling.run_epoch();
    assert_eq!(first.window, 3);
    let second = coupling.run_epoch();
    assert_eq!(second.window, 6);
    let third = coupling.run_epoch();
    assert_eq!(third.window, 12);
    assert_eq!(third.epoch, 3);
    let lengths: Vec<u64> = coupling.blocks().iter().map(|block| block.length).collect();
    assert_eq!(lengths, vec![6, 3, 3]);

    coupling.reset();
    assert_eq!(coupling.state(), CftpState::Idle);
    assert_eq!(coupling.window(), 0);
    assert_eq!(coupling.gap(), coupling.minimum().gap(coupling.maximum()));
}

#[test]
fn sessions_with_equal_config_agree() {
    let config = SamplerConfig {
        mode: SamplingMode::CftpParallel,
        ..SamplerConfig::default()
    };
    let mut first = Session::new(&aztec_diamond(3), config.clone()).unwrap();
    let mut second = Session::new(&aztec_diamond(3), config).unwrap();
    for _ in 0..3 {
        first.run_until_exact(&NoopMonitor).unwrap();
        second.run_until_exact(&NoopMonitor).unwrap();
        assert_eq!(first.export_configuration(), second.export_configuration());
    }
    assert_eq!(first.diagnostics().exact_samples, 3);
}

#[test]
fn batch_matches_sequential_draws() {
    let graph = Arc::new(RegionGraph::build(&aztec_diamond(3)).unwrap());
    for coupling in [Coupling::Serial, Coupling::Parallel] {
        let options = CftpOptions {
            master_seed: 9,
            coupling,
            threads: 2,
            ..CftpOptions::default()
        };
        let mut sequential = coupler(&graph, options);
        let expected: Vec<_> = (0..5)
            .map(|_| sequential.run_until_exact(&NoopMonitor).unwrap().configuration)
            .collect();

        let mut batched = coupler(&graph, options);
        let drawn: Vec<_> = batched
            .sample_batch(5, &NoopMonitor)
            .unwrap()
            .into_iter()
            .map(|sample| sample.configuration)
            .collect();
        assert_eq!(drawn, expected, "{coupling:?}");
        assert_eq!(batched.samples_taken(), 5);
        assert_eq!(batched.state(), CftpState::Idle);

        let next = batched.run_until_exact(&NoopMonitor).unwrap();
        assert_eq!(next, sequential.run_until_exact(&NoopMonitor).unwrap());
    }
}
