use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use delatin::{triangulate, Error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_grid(side: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..side * side).map(|_| rng.gen_range(0..=255) as f64).collect()
}

fn bench_triangulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulate");

    for side in [32usize, 64, 128] {
        let data = random_grid(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &data, |b, data| {
            b.iter(|| triangulate(black_box(data), side, side, Error(1.0)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_triangulate);
criterion_main!(benches);
