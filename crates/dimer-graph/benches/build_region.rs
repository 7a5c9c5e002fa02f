use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dimer_graph::{aztec_diamond, hexagon, RegionGraph};

fn build_region_bench(c: &mut Criterion) {
    c.bench_function("build_aztec_40", |b| {
        let spec = aztec_diamond(40);
        b.iter(|| {
            let graph = RegionGraph::build(&spec).unwrap();
            black_box(graph);
        });
    });
    c.bench_function("build_hexagon_20", |b| {
        let spec = hexagon(20);
        b.iter(|| {
            let graph = RegionGraph::build(&spec).unwrap();
            black_box(graph);
        });
    });
}

criterion_group!(benches, build_region_bench);
criterion_main!(benches);
