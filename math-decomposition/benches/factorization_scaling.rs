//! Benchmark: dense factorization scaling
//!
//! Compares full factorizations against the O(n^2) rank-one updates that
//! replace them.
//!
//! Run with:
//!   cargo bench -p math-audio-decomposition --bench factorization_scaling

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use math_audio_decomposition::{
    CholeskyFactor, CroutLu, DoolittleLu, LuFactor, PivotType, QrFactor, TridiagonalLu,
};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const SIZES: [usize; 4] = [16, 32, 64, 128];

fn random_matrix(rng: &mut StdRng, n: usize) -> Array2<f64> {
    let mut a = Array2::from_shape_fn((n, n), |_| rng.random_range(-1.0..1.0));
    for i in 0..n {
        a[[i, i]] += n as f64;
    }
    a
}

fn random_spd(rng: &mut StdRng, n: usize) -> Array2<f64> {
    let b = random_matrix(rng, n);
    b.dot(&b.t())
}

fn random_vector(rng: &mut StdRng, n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |_| rng.random_range(-1.0..1.0))
}

/// Benchmark full factorizations of every family
fn bench_factor(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));
    let mut rng = StdRng::seed_from_u64(1);

    for &n in &SIZES {
        group.throughput(Throughput::Elements((n * n) as u64));
        let a = random_matrix(&mut rng, n);
        let spd = random_spd(&mut rng, n);

        group.bench_with_input(BenchmarkId::new("doolittle", n), &a, |b, a| {
            let mut solver = DoolittleLu::new();
            b.iter(|| {
                let mut lu = a.clone();
                black_box(solver.factor(&mut lu).ok());
                lu
            });
        });

        group.bench_with_input(BenchmarkId::new("crout", n), &a, |b, a| {
            let mut solver = CroutLu::new();
            b.iter(|| {
                let mut lu = a.clone();
                black_box(solver.factor(&mut lu).ok());
                lu
            });
        });

        group.bench_with_input(BenchmarkId::new("tridiagonal", n), &a, |b, a| {
            let mut solver = TridiagonalLu::new();
            b.iter(|| {
                let mut lu = a.clone();
                black_box(solver.factor(&mut lu).ok());
                lu
            });
        });

        group.bench_with_input(BenchmarkId::new("cholesky", n), &spd, |b, spd| {
            let solver = CholeskyFactor::new();
            b.iter(|| {
                let mut l = spd.clone();
                black_box(solver.factor(&mut l).ok());
                l
            });
        });

        group.bench_with_input(BenchmarkId::new("householder_qr", n), &a, |b, a| {
            let mut solver = QrFactor::new();
            let mut u = Array1::zeros(n);
            b.iter(|| {
                let mut qr = a.clone();
                black_box(solver.factor(&mut qr, &mut u).ok());
                qr
            });
        });
    }

    group.finish();
}

/// Benchmark rank-one updates against their factorizations
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_one_update");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));
    let mut rng = StdRng::seed_from_u64(2);

    for &n in &SIZES {
        group.throughput(Throughput::Elements((n * n) as u64));
        let a = random_matrix(&mut rng, n);
        let x = random_vector(&mut rng, n);
        let y = random_vector(&mut rng, n);

        let mut doolittle = DoolittleLu::new();
        let mut lu = a.clone();
        if doolittle.factor(&mut lu).is_err() {
            continue;
        }
        let p = doolittle
            .pivot_state()
            .permutation_vector(PivotType::Row)
            .to_vec();

        group.bench_function(BenchmarkId::new("bennett", n), |b| {
            b.iter(|| {
                let mut work = lu.clone();
                black_box(doolittle.update(&mut work, &x, &y, Some(p.as_slice())).ok());
                work
            });
        });

        let l = doolittle.lower_triangle(&lu);
        let u = doolittle.upper_triangle(&lu);
        group.bench_function(BenchmarkId::new("pivoted_lu", n), |b| {
            b.iter(|| {
                let (mut l, mut u, mut p) = (l.clone(), u.clone(), p.clone());
                black_box(doolittle.update_pivoted(&mut l, &mut u, &mut p, &x, &y).ok());
                (l, u)
            });
        });

        let spd = random_spd(&mut rng, n);
        let cholesky = CholeskyFactor::new();
        let mut factor = spd.clone();
        if cholesky.factor(&mut factor).is_err() {
            continue;
        }
        group.bench_function(BenchmarkId::new("cholesky", n), |b| {
            b.iter(|| {
                let mut l = factor.clone();
                black_box(cholesky.update(&mut l, &x).ok());
                l
            });
        });

        let mut qr_solver = QrFactor::new();
        let mut qr = a.clone();
        let mut coefficients = Array1::zeros(n);
        if qr_solver.factor(&mut qr, &mut coefficients).is_err() {
            continue;
        }
        let Ok(q) = qr_solver.orthogonal_matrix(&qr, &coefficients) else {
            continue;
        };
        let r = qr_solver.upper_triangle(&qr);
        let columns = qr_solver
            .pivot_state()
            .permutation_vector(PivotType::Column)
            .to_vec();
        group.bench_function(BenchmarkId::new("givens_qr", n), |b| {
            b.iter(|| {
                let (mut q, mut r) = (q.clone(), r.clone());
                black_box(qr_solver.update(&mut q, &mut r, &x, &y, Some(columns.as_slice())).ok());
                (q, r)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_factor, bench_update);
criterion_main!(benches);
