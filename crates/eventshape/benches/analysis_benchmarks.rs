//! Full comparison pipeline performance benchmarks.
//!
//! Measures end-to-end comparison including reading, sampling, inference,
//! rule generation and validation of both versions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

use eventshape::{EventShape, MemorySource, TypeAnalyzer};

/// Generate realistic telemetry events as JSON lines.
fn generate_events(rows: usize) -> String {
    let platforms = ["ios", "android", "web"];
    let mut data = String::new();

    for row in 0..rows {
        let event = json!({
            "event_id": format!("EVT-{:07}", row),
            "platform": platforms[row % platforms.len()],
            "duration_ms": (row * 37) % 5000,
            "created_at": format!("2024-{:02}-{:02}T{:02}:15:00Z", (row % 12) + 1, (row % 28) + 1, row % 24),
            "ts": 1_705_312_800 + row as i64,
            "tags": format!("[{}, {}]", platforms[row % 3], platforms[(row + 1) % 3]),
            "context": {"os_version": format!("{}.{}", 14 + row % 4, row % 10), "locale": "en_US"},
        });
        data.push_str(&event.to_string());
        data.push('\n');
    }

    data
}

/// Benchmark the full comparison of two files.
fn bench_full_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_comparison");
    group.sample_size(20);

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_events(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64 * 2));

        group.bench_with_input(BenchmarkId::new("jsonl_rows", rows), &data, |b, data| {
            b.iter_with_setup(
                || {
                    let mut temp = NamedTempFile::with_suffix(".jsonl").unwrap();
                    temp.write_all(data.as_bytes()).unwrap();
                    temp
                },
                |temp| {
                    let shape = EventShape::new();
                    let old = shape.open(temp.path()).unwrap();
                    let new = shape.open(temp.path()).unwrap();
                    black_box(shape.compare(old.as_ref(), new.as_ref()).unwrap())
                },
            )
        });
    }

    group.finish();
}

/// Benchmark profiling alone on in-memory samples.
fn bench_profiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("profiling");
    let analyzer = TypeAnalyzer::new();

    for size in [100usize, 1_000, 10_000].iter() {
        let numeric: Vec<Value> = (0..*size).map(|i| json!(i as f64 * 1.5)).collect();
        let codes: Vec<Value> = (0..*size).map(|i| json!(format!("AB-{:05}", i))).collect();
        let free: Vec<Value> = (0..*size)
            .map(|i| json!(format!("message number {} from user", i)))
            .collect();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("numeric", size), &numeric, |b, sample| {
            b.iter(|| black_box(analyzer.analyze("n", sample)))
        });
        group.bench_with_input(BenchmarkId::new("formatted", size), &codes, |b, sample| {
            b.iter(|| black_box(analyzer.analyze("code", sample)))
        });
        group.bench_with_input(BenchmarkId::new("free_text", size), &free, |b, sample| {
            b.iter(|| black_box(analyzer.analyze("message", sample)))
        });
    }

    group.finish();
}

/// Benchmark the in-memory pipeline without file I/O.
fn bench_memory_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_pipeline");
    group.sample_size(20);

    let events: Vec<Value> = generate_events(5_000)
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    let source = MemorySource::from_json(events, 1_000);

    group.bench_function("compare_5k_events", |b| {
        let shape = EventShape::new();
        b.iter(|| black_box(shape.compare(&source, &source).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_full_comparison, bench_profiling, bench_memory_pipeline);
criterion_main!(benches);
