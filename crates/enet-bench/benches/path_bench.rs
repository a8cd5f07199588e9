//! Path-engine benchmark: warm-started sweep across a full alpha-grid.

use criterion::{criterion_group, criterion_main, Criterion};
use enet::{lasso_path, PathParams};
use enet_core::{DenseMatrix, DesignMatrix, Target};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn synthetic(n_samples: usize, n_features: usize) -> (DesignMatrix, Target) {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut data = vec![0.0; n_samples * n_features];
    for v in data.iter_mut() {
        *v = rng.gen_range(-1.0..1.0);
    }
    let y: Vec<f64> = (0..n_samples).map(|_| rng.gen_range(-1.0..1.0)).collect();
    (
        DesignMatrix::Dense(DenseMatrix::from_column_major(data, n_samples, n_features).unwrap()),
        Target::Mono(y),
    )
}

fn bench_lasso_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("lasso_path");
    group.bench_function("100x10_100alphas", |b| {
        b.iter(|| {
            let (x, y) = synthetic(100, 10);
            let params = PathParams {
                n_alphas: 100,
                tol: 1e-6,
                ..Default::default()
            };
            lasso_path(x, y, params).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_lasso_path);
criterion_main!(benches);
