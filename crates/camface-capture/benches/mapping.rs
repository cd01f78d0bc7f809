//! Mapping and Selection Benchmarks
//!
//! Measures the per-frame cost of placing face detections on the overlay and
//! the one-off cost of size negotiation.
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package camface-capture --bench mapping
//! ```

use camface_capture::{detection_to_view_transform, select_optimal_preview_size};
use camface_models::{DetectionRect, Rotation, Size};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

fn detections(count: i32) -> Vec<DetectionRect> {
    (0..count)
        .map(|i| {
            let x = -900 + i * 150;
            DetectionRect::new(x, -200, x + 120, -60)
        })
        .collect()
}

/// Benchmark building the sensor-to-view transform.
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for &rotation in Rotation::ALL {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("build", rotation.degrees()),
            &rotation,
            |b, &rotation| {
                b.iter(|| {
                    let transform =
                        detection_to_view_transform(black_box(true), rotation, 1440, 2478);
                    black_box(transform)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark mapping a batch of faces, as done once per detector callback.
fn bench_map_faces(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_faces");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let transform = detection_to_view_transform(false, Rotation::Deg90, 1440, 2478);

    for count in [1, 5, 10] {
        let faces = detections(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("faces", count), &faces, |b, faces| {
            b.iter(|| {
                let rects: Vec<_> = faces.iter().map(|r| transform.map_rect(black_box(r))).collect();
                black_box(rects)
            })
        });
    }

    group.finish();
}

/// Benchmark preview size negotiation against a typical catalog.
fn bench_preview_selection(c: &mut Criterion) {
    let catalog = [
        Size::new(1920, 1080),
        Size::new(1440, 1080),
        Size::new(1280, 960),
        Size::new(1280, 720),
        Size::new(960, 720),
        Size::new(640, 480),
        Size::new(352, 288),
        Size::new(320, 240),
        Size::new(176, 144),
    ];

    c.bench_function("select_optimal_preview_size", |b| {
        b.iter(|| {
            let selection =
                select_optimal_preview_size(black_box(&catalog), 720, Size::new(4000, 3000));
            black_box(selection)
        })
    });
}

criterion_group!(
    benches,
    bench_transform,
    bench_map_faces,
    bench_preview_selection
);
criterion_main!(benches);
