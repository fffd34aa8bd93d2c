//! # Odometry and Line Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lf_lib::{
    line_ctrl::{LineCtrl, Params, PidState},
    loc::{integrate, Pose, WheelDelta},
};

fn odometry_benchmark(c: &mut Criterion) {
    // A gentle left turn, one cycle at 0.2 m/s and 50 Hz
    let delta = WheelDelta::new(0.0039, 0.0041);

    c.bench_function("loc::integrate", |b| {
        let mut pose = Pose::default();
        b.iter(|| {
            pose = integrate(black_box(&pose), black_box(&delta), 0.15);
        })
    });

    // A full lap worth of cycles
    c.bench_function("loc::integrate::lap", |b| {
        b.iter(|| {
            let mut pose = Pose::default();
            for _ in 0..1600 {
                pose = integrate(&pose, black_box(&delta), 0.15);
            }
            pose
        })
    });
}

fn line_ctrl_benchmark(c: &mut Criterion) {
    let line_ctrl = LineCtrl::init(Params {
        k_p: 0.05,
        k_i: 0.02,
        k_d: 0.01,
        i_min: -1.0,
        i_max: 1.0,
    }).unwrap();

    c.bench_function("LineCtrl::proc", |b| {
        let mut state = PidState::new();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let err = ((i % 200) as f64 / 100.0) - 1.0;
            line_ctrl.proc(&mut state, black_box(err), 0.02)
        })
    });
}

criterion_group!(benches, odometry_benchmark, line_ctrl_benchmark);
criterion_main!(benches);
