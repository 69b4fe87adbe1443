//! Benchmarks for tailwatch-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::{Array1, Array2};
use rand::Rng;
use tailwatch_math::{GaussianKde, linspace, ordinary_least_squares, quantile, simpson};

fn random_returns(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05).collect()
}

fn random_matrix(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| rng.r#gen::<f64>() * 0.02 - 0.01)
}

fn bench_quantile(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantile");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_returns(size);
            b.iter(|| quantile(black_box(&data), black_box(0.3)).unwrap());
        });
    }

    group.finish();
}

fn bench_ols(c: &mut Criterion) {
    let mut group = c.benchmark_group("ols");

    // A daily firm history against three or five factors
    for (n_obs, n_factors) in [(250, 3), (250, 5), (2500, 3), (2500, 5)] {
        group.throughput(Throughput::Elements(n_obs as u64));
        group.bench_with_input(
            BenchmarkId::new("obs_factors", format!("{n_obs}_{n_factors}")),
            &(n_obs, n_factors),
            |b, &(n_obs, n_factors)| {
                let y = Array1::from(random_returns(n_obs));
                let x = random_matrix(n_obs, n_factors);
                b.iter(|| ordinary_least_squares(black_box(&y), black_box(&x)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_kde(c: &mut Criterion) {
    let mut group = c.benchmark_group("kde");
    group.sample_size(10);

    for size in [1000, 10000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_returns(size);
            let grid = linspace(-3.0, 3.0, 2000);
            b.iter(|| {
                let kde = GaussianKde::new(black_box(&data), 1.0).unwrap();
                simpson(&kde.evaluate(&grid), &grid).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_quantile, bench_ols, bench_kde);
criterion_main!(benches);
