//! Benchmarks for decoding and summary building
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use health_export_parser::{
    HealthExport, HealthExporter, MetricSummary, ProcessOptions, SeriesKind, Statistics,
    WorkoutSummary,
};
use tempfile::tempdir;

fn sample_time(i: usize) -> String {
    format!(
        "2025-11-12 {:02}:{:02}:{:02} -0500",
        (i / 3600) % 24,
        (i / 60) % 60,
        i % 60
    )
}

fn create_test_export(workouts: usize, points: usize) -> String {
    let heart_rate: Vec<String> = (0..points)
        .map(|i| {
            format!(
                r#"{{"Avg": {}, "Min": 90, "Max": 160, "date": "{}", "source": "bench", "units": "bpm"}}"#,
                100 + i % 50,
                sample_time(i)
            )
        })
        .collect();
    let quantity: Vec<String> = (0..points)
        .map(|i| {
            format!(
                r#"{{"qty": {}, "date": "{}", "source": "bench", "units": "kcal"}}"#,
                (i % 10) as f64 * 0.5,
                sample_time(i)
            )
        })
        .collect();

    let workout_list: Vec<String> = (0..workouts)
        .map(|i| {
            format!(
                r#"{{"id": "W-{i}", "name": "Outdoor Run", "start": "{start}", "end": "{start}",
                    "duration": 1800, "activeEnergyBurned": {{"qty": 250, "units": "kcal"}},
                    "heartRateData": [{hr}], "activeEnergy": [{q}], "stepCount": [{q}]}}"#,
                start = sample_time(i * 60),
                hr = heart_rate.join(","),
                q = quantity.join(","),
            )
        })
        .collect();

    let metric_data: Vec<String> = (0..points)
        .map(|i| format!(r#"{{"date": "{}", "qty": {}}}"#, sample_time(i), i % 100))
        .collect();

    format!(
        r#"{{"data": {{"metrics": [{{"name": "step_count", "units": "count", "data": [{}]}}], "workouts": [{}]}}}}"#,
        metric_data.join(","),
        workout_list.join(",")
    )
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for workouts in [10, 100] {
        let doc = create_test_export(workouts, 100);

        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_function(format!("export_{}_workouts", workouts), |b| {
            b.iter(|| HealthExport::from_slice(black_box(doc.as_bytes())).unwrap())
        });
    }

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [100, 1000, 10000] {
        let values: Vec<f64> = (0..size).map(|i| (i % 97) as f64).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("cumulative_{}", size), |b| {
            b.iter(|| Statistics::of_values(black_box(&values), SeriesKind::Cumulative))
        });
        group.bench_function(format!("instantaneous_{}", size), |b| {
            b.iter(|| Statistics::of_values(black_box(&values), SeriesKind::Instantaneous))
        });
    }

    group.finish();
}

fn bench_summaries(c: &mut Criterion) {
    let mut group = c.benchmark_group("summaries");

    let export = HealthExport::from_slice(create_test_export(1, 1000).as_bytes()).unwrap();
    let workout = &export.data.workouts[0];
    let metric = &export.data.metrics[0];

    group.bench_function("workout_1000_points", |b| {
        b.iter(|| WorkoutSummary::build(black_box(workout)))
    });
    group.bench_function("metric_1000_points", |b| {
        b.iter(|| MetricSummary::build(black_box(metric)))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let dir = tempdir().unwrap();
    let source = dir.path().join("export.json");
    std::fs::write(&source, create_test_export(50, 100)).unwrap();

    let exporter =
        HealthExporter::new(ProcessOptions::new(&source, dir.path().join("exports"))).unwrap();

    group.bench_function("run_50_workouts", |b| b.iter(|| exporter.run().unwrap()));

    group.finish();
}

criterion_group!(
    benches,
    bench_decode,
    bench_statistics,
    bench_summaries,
    bench_pipeline
);
criterion_main!(benches);
