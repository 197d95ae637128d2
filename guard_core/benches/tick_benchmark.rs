//! Tick benchmark: cost of one fusion tick with a full tracker history.
//!
//! The tracker scans its window on every sample, so the interesting case is
//! a history filled to the longest window at a high sample rate.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use guard_common::config::GuardConfig;
use guard_common::types::{CabinetZone, Gesture, Pose, RangeSample, VisionSample};
use guard_core::fusion::FusionEngine;
use guard_core::range::classify;

const SITE: &str = r#"
[shared]
service_name = "bench"

[tracker]
static_window_s = 10.0
walk_window_s = 10.0

[line]
a = 1.0
b = 0.2
c = -500.0
outer_safe_px = 20.0
inner_danger_px = -10.0
frame_width_px = 1280.0
frame_height_px = 720.0

[site]
authorized_cabinets = [2]

[[cabinets]]
cabinet_id = 1
d_min_m = 1.8
d_max_m = 2.2

[[cabinets]]
cabinet_id = 2
d_min_m = 3.3
d_max_m = 3.7
"#;

fn vision(t: f64) -> VisionSample {
    VisionSample {
        foot_x: 700.0,
        foot_y: 600.0,
        pose: Pose::FacingCabinet,
        gesture: Gesture::None,
        timestamp_s: t,
    }
}

fn bench_tick(c: &mut Criterion) {
    let config = GuardConfig::from_toml_str(SITE).unwrap();
    let mut group = c.benchmark_group("fusion_tick");

    for rate_hz in [10u32, 50] {
        let dt = 1.0 / f64::from(rate_hz);
        let mut engine = FusionEngine::new(&config).unwrap();
        let mut t = 0.0;
        // fill the 10 s window
        for _ in 0..rate_hz * 10 {
            engine.tick(Some(RangeSample::new(3.5, 1.0, t)), Some(vision(t)));
            t += dt;
        }

        group.bench_with_input(BenchmarkId::from_parameter(rate_hz), &dt, |b, &dt| {
            b.iter(|| {
                t += dt;
                black_box(engine.tick(
                    Some(RangeSample::new(black_box(3.5), 1.0, t)),
                    Some(vision(t)),
                ))
            })
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let zones: Vec<CabinetZone> = (0..32)
        .map(|i| CabinetZone::new(i, f64::from(i) * 0.5, f64::from(i) * 0.5 + 0.4))
        .collect();
    c.bench_function("range_classify_32_zones", |b| {
        b.iter(|| classify(black_box(7.7), black_box(&zones)))
    });
}

criterion_group!(benches, bench_tick, bench_classify);
criterion_main!(benches);
