//! Throughput Benchmark for sqlgate
//!
//! This benchmark measures framing, result encoding, and statement
//! execution against a temporary store.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sqlgate::executor::{encode, StatementExecutor};
use sqlgate::protocol::FrameBuffer;
use sqlgate::storage::{Row, Store, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Benchmark splitting a pipelined buffer into frames
fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");

    let mut wire = Vec::new();
    for i in 0..100 {
        wire.extend_from_slice(format!("INSERT INTO T VALUES ({})", i).as_bytes());
        wire.push(0);
    }
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("split_100_frames", |b| {
        b.iter(|| {
            let mut frames = FrameBuffer::default();
            frames.buffer_mut().extend_from_slice(&wire);
            let mut count = 0;
            while let Some(frame) = frames.next_frame().unwrap() {
                black_box(frame);
                count += 1;
            }
            assert_eq!(count, 100);
        });
    });

    group.bench_function("reassemble_fragments", |b| {
        let statement = "SELECT username, login_time FROM Logins WHERE logout_time IS NULL\0";
        b.iter(|| {
            let mut frames = FrameBuffer::default();
            for chunk in statement.as_bytes().chunks(7) {
                frames.buffer_mut().extend_from_slice(chunk);
                if let Some(frame) = frames.next_frame().unwrap() {
                    black_box(frame);
                }
            }
        });
    });

    group.finish();
}

/// Benchmark result encoding
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let rows: Vec<Row> = (0..1000)
        .map(|i| {
            vec![
                Value::Integer(i),
                Value::Text(format!("user{}", i)),
                Value::Real(i as f64 / 3.0),
                Value::Null,
            ]
        })
        .collect();
    group.throughput(Throughput::Elements(rows.len() as u64));

    group.bench_function("table_1000x4", |b| {
        b.iter(|| black_box(encode(black_box(&rows))));
    });

    let scalar = vec![vec![Value::Integer(42)]];
    group.bench_function("scalar", |b| {
        b.iter(|| black_box(encode(black_box(&scalar))));
    });

    group.finish();
}

/// Benchmark full statement execution (open, run, close per call)
fn bench_execute(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::new(dir.path().join("bench.db")));
    store.init_schema().unwrap();
    let executor = StatementExecutor::new(store);

    for i in 0..100 {
        executor.execute(&format!(
            "INSERT INTO Users VALUES ('user{}', 'pw{}')",
            i, i
        ));
    }

    let mut group = c.benchmark_group("execute");
    group.throughput(Throughput::Elements(1));

    group.bench_function("count_query", |b| {
        b.iter(|| black_box(executor.execute("SELECT COUNT(*) FROM Users")));
    });

    group.bench_function("table_query", |b| {
        b.iter(|| black_box(executor.execute("SELECT username, password FROM Users")));
    });

    group.bench_function("insert_command", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let response = executor.execute(&format!(
                "INSERT INTO Logins (username, login_time) VALUES ('user{}', datetime('now'))",
                i % 100
            ));
            i += 1;
            black_box(response)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_framing, bench_encode, bench_execute);
criterion_main!(benches);
