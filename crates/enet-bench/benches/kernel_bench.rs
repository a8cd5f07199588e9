//! Coordinate-descent kernel benchmarks: one group per kernel variant.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use enet_core::kernel::dense::dense_coordinate_descent;
use enet_core::kernel::gram::gram_coordinate_descent;
use enet_core::kernel::sparse::sparse_coordinate_descent;
use enet_core::{CscMatrix, DenseMatrix, RegStrengths};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn synthetic_dense(n_samples: usize, n_features: usize, seed: u64) -> (DenseMatrix, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0.0; n_samples * n_features];
    for v in data.iter_mut() {
        *v = rng.gen_range(-1.0..1.0);
    }
    let x = DenseMatrix::from_column_major(data, n_samples, n_features).unwrap();
    let y: Vec<f64> = (0..n_samples).map(|_| rng.gen_range(-1.0..1.0)).collect();
    (x, y)
}

fn bench_dense_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_kernel");
    for &(n, p) in &[(200usize, 20usize), (1000, 50)] {
        let (x, y) = synthetic_dense(n, p, 1);
        let reg = RegStrengths::from_alpha(0.1, 0.5, n);
        group.bench_with_input(BenchmarkId::new("sweep", format!("{n}x{p}")), &(), |b, _| {
            b.iter(|| {
                let mut w = vec![0.0; p];
                dense_coordinate_descent(&x, &y, &mut w, reg, 1000, 1e-6, false).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_gram_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("gram_kernel");
    let (x, y) = synthetic_dense(500, 30, 2);
    let p = x.n_features();
    let mut g_data = vec![0.0; p * p];
    for j in 0..p {
        for k in 0..p {
            g_data[j * p + k] = x.column(j).iter().zip(x.column(k)).map(|(&a, &b)| a * b).sum();
        }
    }
    let g = DenseMatrix::from_column_major(g_data, p, p).unwrap();
    let xy: Vec<f64> = (0..p).map(|j| x.column(j).iter().zip(&y).map(|(&a, &b)| a * b).sum()).collect();
    let y_norm2: f64 = y.iter().map(|v| v * v).sum();
    let reg = RegStrengths::from_alpha(0.1, 0.5, x.n_samples());

    group.bench_function("sweep_500x30", |b| {
        b.iter(|| {
            let mut w = vec![0.0; p];
            gram_coordinate_descent(&g, &xy, y_norm2, &mut w, reg, 1000, 1e-6, false).unwrap();
        });
    });
    group.finish();
}

fn bench_sparse_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_kernel");
    let n_samples = 1000;
    let n_features = 100;
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut data = Vec::new();
    let mut row_indices = Vec::new();
    let mut col_ptr = vec![0u32];
    for _ in 0..n_features {
        for row in 0..n_samples {
            if rng.gen_bool(0.1) {
                data.push(rng.gen_range(-1.0..1.0));
                row_indices.push(row as u32);
            }
        }
        col_ptr.push(data.len() as u32);
    }
    let x = CscMatrix::new(data, row_indices, col_ptr, n_samples).unwrap();
    let y: Vec<f64> = (0..n_samples).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mu = vec![0.0; n_features];
    let reg = RegStrengths::from_alpha(0.1, 0.5, n_samples);

    group.bench_function("sweep_1000x100_10pct", |b| {
        b.iter(|| {
            let mut w = vec![0.0; n_features];
            sparse_coordinate_descent(&x, &y, &mu, &mut w, reg, 1000, 1e-6, false).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_dense_kernel, bench_gram_kernel, bench_sparse_kernel);
criterion_main!(benches);
