use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scan_threads::gauge::{Gauge, PointerEvent, RidgeBoundary};
use scan_threads::{
    derive_measurement, match_catalog, CropRegion, MeasureConfig, ThreadStandardEntry, Tolerance,
};

fn synthetic_catalog() -> Vec<ThreadStandardEntry> {
    (1..=400)
        .map(|i| {
            let d = f64::from(i) * 0.25;
            if i % 3 == 0 {
                ThreadStandardEntry::imperial(format!("I{}", i), d, f64::from(8 + i % 32))
            } else {
                ThreadStandardEntry::metric(format!("M{}", i), d, 0.25 + f64::from(i % 12) * 0.25)
            }
        })
        .collect()
}

fn benchmark_matching(c: &mut Criterion) {
    let catalog = synthetic_catalog();
    c.bench_function("match_catalog_400_rows", |b| {
        b.iter(|| {
            match_catalog(
                black_box(&catalog),
                black_box(12.0),
                black_box(1.25),
                Tolerance::default(),
            )
        })
    });
}

fn benchmark_gauge(c: &mut Criterion) {
    let config = MeasureConfig::default();
    c.bench_function("gauge_drag_and_measure", |b| {
        b.iter(|| {
            let mut gauge = Gauge::new(&config.gauge, 800, 600);
            gauge.handle_pointer(PointerEvent::Down { x: 250.0, y: 140.0 });
            for step in 0..50 {
                let x = 250.0 + f64::from(step);
                gauge.handle_pointer(PointerEvent::Move { x, y: 140.0 });
            }
            gauge.handle_pointer(PointerEvent::Up { x: 300.0, y: 140.0 });
            derive_measurement(gauge.state(), CropRegion::offset(400, 300), 0.8, 0.108)
        })
    });

    let gauge = Gauge::new(&config.gauge, 800, 600);
    c.bench_function("ridge_trace", |b| {
        b.iter(|| black_box(gauge.state()).ridge_trace(RidgeBoundary::Top))
    });
}

criterion_group!(benches, benchmark_matching, benchmark_gauge);
criterion_main!(benches);
