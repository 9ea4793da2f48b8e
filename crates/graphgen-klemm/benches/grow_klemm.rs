use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graphgen_klemm::{klemm_graph, KlemmConfig};

fn grow_bench(c: &mut Criterion) {
    let config = KlemmConfig::new(5_000, 6, 0.5, 42);
    c.bench_function("klemm_5k", |b| {
        b.iter(|| {
            let outcome = klemm_graph(&config).unwrap();
            black_box(outcome);
        });
    });
}

criterion_group!(benches, grow_bench);
criterion_main!(benches);
