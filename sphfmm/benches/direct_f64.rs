use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use sphfmm::fmm::direct::direct;
use sphfmm::tree::helpers::bodies_fixture;

fn direct_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("Direct F64");

    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(15));

    for n_bodies in [1000, 10000] {
        let sources = bodies_fixture::<f64>(n_bodies, None, None, Some(0), true);
        let mut targets = sources.clone();

        group.bench_function(format!("N={n_bodies}"), |b| {
            b.iter(|| direct(&mut targets, &sources, &[0.0; 3]))
        });
    }
}

criterion_group!(benches, direct_f64);
criterion_main!(benches);
