use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use sphfmm::tree::helpers::bodies_fixture;
use sphfmm::{KernelContext, SingleNodeBuilder};

fn precomputation_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("F64 Setup");

    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(15));

    for e in [6, 10, 16] {
        group.bench_function(format!("Kernel tables expansion_order={e}"), |b| {
            b.iter(|| KernelContext::<f64>::new(e).unwrap())
        });
    }

    {
        let n_bodies = 100000;
        let bodies = bodies_fixture::<f64>(n_bodies, None, None, Some(0), true);

        group.bench_function(format!("Tree and interaction lists N={n_bodies}"), |b| {
            b.iter(|| {
                SingleNodeBuilder::new()
                    .tree(&bodies, Some(64))
                    .unwrap()
                    .parameters(6, Some(0.4))
                    .unwrap()
                    .build()
                    .unwrap()
            })
        });
    }
}

criterion_group!(benches, precomputation_f64);
criterion_main!(benches);
