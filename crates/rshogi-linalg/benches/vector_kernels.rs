use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rshogi_linalg::simd::{self, Kernel, LANES, NativeKernel, Scalar};
use rshogi_linalg::{NativePackedVector, Vector};
use std::hint::black_box;

const ACC_LEN: usize = 256;

fn init_data(len: usize) -> (Vec<f32>, Vec<f32>) {
    let mut a = vec![0.0f32; len];
    let mut b = vec![0.0f32; len];
    for i in 0..len {
        a[i] = (i as f32 * 0.001).sin();
        b[i] = ((i as f32 + 3.0) * 0.002).cos();
    }
    (a, b)
}

fn bench_dot_with<K: Kernel>(g: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    for &len in &[32usize, ACC_LEN, 257, 2048] {
        let (a, b) = init_data(len);
        g.bench_with_input(BenchmarkId::new(K::NAME, len), &len, |bench, _| {
            bench.iter(|| simd::dot::<K>(black_box(&a), black_box(&b)));
        });
    }
}

pub fn bench_dot(c: &mut Criterion) {
    let mut g = c.benchmark_group("dot_f32");
    bench_dot_with::<NativeKernel>(&mut g);
    bench_dot_with::<Scalar>(&mut g);
    g.finish();
}

pub fn bench_fma_scalar(c: &mut Criterion) {
    let mut g = c.benchmark_group("fma_scalar_f32");
    let (a0, row) = init_data(ACC_LEN);

    // 加算→減算で原状復帰させ、コピーを計測に含めない
    let mut acc = a0.clone();
    g.bench_function(BenchmarkId::new(NativeKernel::NAME, ACC_LEN), |b| {
        b.iter(|| {
            simd::fma_scalar::<NativeKernel>(black_box(&mut acc), black_box(&row), 0.75);
            simd::fma_scalar::<NativeKernel>(black_box(&mut acc), black_box(&row), -0.75);
        });
    });

    let mut acc = a0;
    g.bench_function(BenchmarkId::new(Scalar::NAME, ACC_LEN), |b| {
        b.iter(|| {
            simd::fma_scalar::<Scalar>(black_box(&mut acc), black_box(&row), 0.75);
            simd::fma_scalar::<Scalar>(black_box(&mut acc), black_box(&row), -0.75);
        });
    });
    g.finish();
}

/// メモリ上のベクトルへの積和と、レジスタ常駐アキュムレータへの積和の比較
pub fn bench_accumulator(c: &mut Criterion) {
    const REGS: usize = ACC_LEN / LANES;
    let mut g = c.benchmark_group("accumulator_16_rows");

    let rows: Vec<Vector<f32, ACC_LEN>> = (0..16)
        .map(|r| {
            let mut v = Vector::zeros();
            for i in 0..ACC_LEN {
                v[i] = ((i * 7 + r * 13) as f32 * 0.01).sin();
            }
            v
        })
        .collect();

    g.bench_function("vector", |b| {
        b.iter(|| {
            let mut acc = Vector::<f32, ACC_LEN>::zeros();
            for (k, row) in rows.iter().enumerate() {
                acc.fma_scalar(black_box(row), k as f32 * 0.125);
            }
            acc.relu();
            black_box(acc)
        });
    });

    g.bench_function("packed", |b| {
        b.iter(|| {
            let mut acc = NativePackedVector::<REGS>::zeros();
            for (k, row) in rows.iter().enumerate() {
                acc.fma_scalar(black_box(row), k as f32 * 0.125);
            }
            acc.relu();
            black_box(acc.store::<ACC_LEN>())
        });
    });
    g.finish();
}

criterion_group!(benches, bench_dot, bench_fma_scalar, bench_accumulator);
criterion_main!(benches);
