//! # Stream Throughput Benchmark
//!
//! REQUIREMENTS:
//! - A frame's worth of command bytes encodes in well under 0.1ms
//! - Steady-state encode performs 0 allocations (capacity is retained)
//!
//! Run with: `cargo bench --package ember_core`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ember_core::{HandleTable, StreamReader, StreamWriter};

/// Commands per simulated frame.
const RECORDS_PER_FRAME: usize = 4096;

/// Benchmark: encode a frame's worth of fixed-size records.
fn bench_stream_write(c: &mut Criterion) {
    let mut writer = StreamWriter::with_capacity(RECORDS_PER_FRAME * 16);

    c.bench_function("stream_write_4096_records", |b| {
        b.iter(|| {
            writer.clear();
            for i in 0..RECORDS_PER_FRAME {
                writer.write_u8(7);
                writer.write_u32(i as u32);
                writer.write_u64(u64::from(i as u32) << 8);
            }
            black_box(writer.len())
        });
    });
}

/// Benchmark: decode the same frame back.
fn bench_stream_read(c: &mut Criterion) {
    let mut writer = StreamWriter::with_capacity(RECORDS_PER_FRAME * 16);
    for i in 0..RECORDS_PER_FRAME {
        writer.write_u8(7);
        writer.write_u32(i as u32);
        writer.write_u64(u64::from(i as u32) << 8);
    }

    c.bench_function("stream_read_4096_records", |b| {
        b.iter(|| {
            let mut reader = StreamReader::new(writer.as_slice());
            let mut sum = 0u64;
            for _ in 0..RECORDS_PER_FRAME {
                let _ = reader.read_u8();
                sum += u64::from(reader.read_u32());
                sum += reader.read_u64();
            }
            black_box(sum)
        });
    });
}

/// Benchmark: handle churn - create/destroy pairs against a full-size table.
fn bench_handle_churn(c: &mut Criterion) {
    let mut table = HandleTable::new(4096);

    c.bench_function("handle_churn_4096", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4096).map(|_| table.create().unwrap()).collect();
            for h in &handles {
                black_box(table.has(*h));
            }
            for h in handles {
                table.destroy(h);
            }
            table.live_count()
        });
    });
}

criterion_group!(
    benches,
    bench_stream_write,
    bench_stream_read,
    bench_handle_churn
);
criterion_main!(benches);
