use std::collections::BTreeMap;
use std::sync::Arc;

use dimer_core::{NoopMonitor, Point};
use dimer_graph::{configuration_hash, heights, hexagon, rectangle, FaceState, RegionGraph};
use dimer_mcmc::{BiasConfig, CftpCoupler, CftpOptions, Coupling, FaceWeights};

fn coupler(graph: &Arc<RegionGraph>, bias: &BiasConfig, options: CftpOptions) -> CftpCoupler {
    let weights = Arc::new(FaceWeights::new(graph, bias).unwrap());
    CftpCoupler::for_region(Arc::clone(graph), weights, options, &NoopMonitor).unwrap()
}

fn up_fraction(bias: &BiasConfig, samples: usize, seed: u64) -> f64 {
    let graph = Arc::new(RegionGraph::build(&rectangle(2, 2)).unwrap());
    let mut coupling = coupler(
        &graph,
        bias,
        CftpOptions {
            master_seed: seed,
            ..CftpOptions::default()
        },
    );
    let mut up = 0;
    for _ in 0..samples {
        let sample = coupling.run_until_exact(&NoopMonitor).unwrap();
        assert!(sample.epochs <= 8);
        if sample.configuration.face_state(graph.face(0)) == FaceState::Up {
            up += 1;
        }
    }
    up as f64 / samples as f64
}

#[test]
fn unit_square_tilings_are_equally_likely() {
    let fraction = up_fraction(&BiasConfig::Uniform, 400, 1);
    assert!((fraction - 0.5).abs() < 0.1, "up fraction {fraction}");
}

#[test]
fn periodic_weights_skew_the_unit_square() {
    let bias = BiasConfig::Periodic {
        period: 2,
        table: vec![1.0, 1.0, 1.0, 3.0],
    };
    let fraction = up_fraction(&bias, 400, 2);
    assert!((fraction - 0.75).abs() < 0.08, "up fraction {fraction}");
}

#[test]
fn two_by_three_tilings_are_uniform() {
    let graph = Arc::new(RegionGraph::build(&rectangle(2, 3)).unwrap());
    let mut coupling = coupler(
        &graph,
        &BiasConfig::Uniform,
        CftpOptions {
            master_seed: 17,
            ..CftpOptions::default()
        },
    );
    let runs = 900;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for _ in 0..runs {
        let sample = coupling.run_until_exact(&NoopMonitor).unwrap();
        *counts
            .entry(configuration_hash(&graph, &sample.configuration))
            .or_default() += 1;
    }
    assert_eq!(counts.len(), 3);
    for (hash, count) in counts {
        let frequency = count as f64 / runs as f64;
        assert!((frequency - 1.0 / 3.0).abs() < 0.06, "{hash}: {frequency}");
    }
}

fn centre_heights(bias: &BiasConfig, coupling: Coupling, seed: u64, runs: usize) -> (i32, i32, Vec<i32>) {
    let graph = Arc::new(RegionGraph::build(&hexagon(2)).unwrap());
    let mut chains = coupler(
        &graph,
        bias,
        CftpOptions {
            master_seed: seed,
            coupling,
            ..CftpOptions::default()
        },
    );
    let centre = Point::new(0, 0);
    let low = heights(&graph, chains.minimum()).get(centre).unwrap();
    let high = heights(&graph, chains.maximum()).get(centre).unwrap();
    let values = (0..runs)
        .map(|_| {
            let sample = chains.run_until_exact(&NoopMonitor).unwrap();
            heights(&graph, &sample.configuration).get(centre).unwrap()
        })
        .collect();
    (low, high, values)
}

#[test]
fn hexagon_centre_height_is_symmetric() {
    let (low, high, values) = centre_heights(&BiasConfig::Uniform, Coupling::Parallel, 5, 300);
    assert!(low < high);
    assert!(values.iter().all(|value| (low..=high).contains(value)));
    let mean = values.iter().map(|&value| f64::from(value)).sum::<f64>() / values.len() as f64;
    let middle = f64::from(low + high) / 2.0;
    assert!((mean - middle).abs() < 0.6, "mean {mean}, middle {middle}");
}

#[test]
fn periodic_weights_skew_the_unit_hexagon() {
    let graph = Arc::new(RegionGraph::build(&hexagon(1)).unwrap());
    let bias = BiasConfig::Periodic {
        period: 2,
        table: vec![3.0, 1.0, 1.0, 1.0],
    };
    for (coupling, seed) in [(Coupling::Serial, 21), (Coupling::Parallel, 22)] {
        let mut chains = coupler(
            &graph,
            &bias,
            CftpOptions {
                master_seed: seed,
                coupling,
                ..CftpOptions::default()
            },
        );
        let runs = 1_000;
        let up = (0..runs)
            .filter(|_| {
                let sample = chains.run_until_exact(&NoopMonitor).unwrap();
                sample.configuration.face_state(graph.face(0)) == FaceState::Up
            })
            .count();
        let fraction = up as f64 / runs as f64;
        assert!((fraction - 0.75).abs() < 0.05, "{coupling:?}: up fraction {fraction}");
    }
}

#[test]
fn periodic_weights_lift_the_hexagon_centre() {
    // Over the 20 tilings of hexagon(2) this table gives the centre height
    // values -4, -1, 2 with probabilities 1/292, 210/292, 81/292.
    let bias = BiasConfig::Periodic {
        period: 2,
        table: vec![3.0, 1.0, 1.0, 3.0],
    };
    for (coupling, seed) in [(Coupling::Serial, 31), (Coupling::Parallel, 32)] {
        let (low, high, values) = centre_heights(&bias, coupling, seed, 600);
        assert_eq!((low, high), (-4, 2));
        let runs = values.len() as f64;
        let mean = values.iter().map(|&value| f64::from(value)).sum::<f64>() / runs;
        let top = values.iter().filter(|&&value| value == high).count() as f64 / runs;
        assert!((mean - (-0.178)).abs() < 0.25, "{coupling:?}: mean {mean}");
        assert!((top - 0.277).abs() < 0.07, "{coupling:?}: top fraction {top}");
    }
}

#[test]
fn coupled_chains_stay_ordered() {
    let graph = Arc::new(RegionGraph::build(&dimer_graph::aztec_diamond(4)).unwrap());
    for coupling in [Coupling::Serial, Coupling::Parallel] {
        let mut chains = coupler(
            &graph,
            &BiasConfig::Scalar { q: 1.5 },
            CftpOptions {
                master_seed: 3,
                initial_block: 4,
                coupling,
                ..CftpOptions::default()
            },
        );
        for _ in 0..6 {
            chains.run_epoch();
            let lower = heights(&graph, chains.lower());
            let upper = heights(&graph, chains.upper());
            assert!(lower.dominated_by(&upper), "{coupling:?}");
            chains.lower().validate(&graph).unwrap();
            chains.upper().validate(&graph).unwrap();
        }
    }
}
