use criterion::{black_box, criterion_group, Criterion};

use cgmath::prelude::*;
use yapcisph::sph::{CubicSpline, Kernel};
use yapcisph::units::*;

fn bench_kernels(c: &mut Criterion) {
    let support_radius = black_box(1.0);

    {
        let xi_minus_xj = black_box(Vector2::new(1.0, 1.0) - Vector2::new(0.5, 1.0));
        let r = black_box(xi_minus_xj.magnitude());
        let kernel = black_box(CubicSpline::<Dim2>::new(support_radius));
        c.bench_function("CubicSpline2D.evaluate", |b| b.iter(|| kernel.evaluate(r)));
        c.bench_function("CubicSpline2D.gradient", |b| b.iter(|| kernel.gradient(xi_minus_xj)));
    }
    {
        let xi_minus_xj = black_box(Vector3::new(1.0, 1.0, 0.2) - Vector3::new(0.5, 1.0, 0.0));
        let r = black_box(xi_minus_xj.magnitude());
        let kernel = black_box(CubicSpline::<Dim3>::new(support_radius));
        c.bench_function("CubicSpline3D.evaluate", |b| b.iter(|| kernel.evaluate(r)));
        c.bench_function("CubicSpline3D.gradient", |b| b.iter(|| kernel.gradient(xi_minus_xj)));
    }
}

fn config() -> Criterion {
    Criterion::default()
        .warm_up_time(core::time::Duration::new(0, 100))
        .sample_size(1000)
        .significance_level(0.1)
}

criterion_group!(
    name = smoothing_kernel;
    config = config();
    targets = bench_kernels
);
