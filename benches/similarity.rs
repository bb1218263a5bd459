//! Benchmarks for batched Tanimoto similarity.

use candle_core::{Device, Tensor};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fingerprint_kernels_rs::{FingerprintKernel, KernelOptions};

fn fingerprint_batch(n: usize, d: usize, device: &Device) -> Tensor {
    let data: Vec<f32> = (0..n * d)
        .map(|i| {
            let h = i.wrapping_mul(2654435761) ^ (i >> 3);
            if h % 5 < 2 {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    Tensor::from_vec(data, (n, d), device).unwrap()
}

fn bench_full_matrix(c: &mut Criterion) {
    let device = Device::Cpu;
    let mut group = c.benchmark_group("tanimoto_full");

    for n in [32, 128, 512].iter() {
        let x = fingerprint_batch(*n, 2048, &device);
        let mut kernel = FingerprintKernel::tanimoto();
        let options = KernelOptions::default();

        group.bench_with_input(BenchmarkId::new("self_similarity", n), n, |bench, _| {
            bench.iter(|| black_box(kernel.forward(&x, &x, &options).unwrap()))
        });
    }

    group.finish();
}

fn bench_diag(c: &mut Criterion) {
    let device = Device::Cpu;
    let mut group = c.benchmark_group("tanimoto_diag");

    for n in [128, 512, 2048].iter() {
        let x1 = fingerprint_batch(*n, 2048, &device);
        let x2 = fingerprint_batch(*n + 1, 2048, &device).narrow(0, 1, *n).unwrap();
        let mut kernel = FingerprintKernel::tanimoto();
        let options = KernelOptions::default().with_diag(true);

        group.bench_with_input(BenchmarkId::new("row_wise", n), n, |bench, _| {
            bench.iter(|| black_box(kernel.forward(&x1, &x2, &options).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_matrix, bench_diag);
criterion_main!(benches);
