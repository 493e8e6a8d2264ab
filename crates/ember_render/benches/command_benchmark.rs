//! # Command Protocol Benchmark
//!
//! REQUIREMENTS:
//! - Encoding a 1000-command frame stays well under the frame budget
//! - Decode is zero-copy for bulk payloads
//!
//! Run with: `cargo bench --package ember_render`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ember_core::{RawHandle, StreamReader, StreamWriter};
use ember_render::protocol::Command;
use ember_render::{VertexBufferId, VertexFormat};

const COMMANDS_PER_FRAME: usize = 1000;

fn encode_frame(writer: &mut StreamWriter, vertices: &[u8]) {
    writer.clear();
    for i in 0..COMMANDS_PER_FRAME {
        #[allow(clippy::cast_possible_truncation)]
        let id = VertexBufferId::from_raw(RawHandle::new((i % 4096) as u16, 0));
        Command::CreateVertexBuffer {
            id,
            count: 3,
            format: VertexFormat::Position3,
            data: vertices,
        }
        .encode(writer);
    }
    Command::End.encode(writer);
}

/// Benchmark: encode a frame of create-vertex-buffer commands.
fn bench_command_encode(c: &mut Criterion) {
    let vertices = [0u8; 36];
    let mut writer = StreamWriter::with_capacity(COMMANDS_PER_FRAME * 64);

    c.bench_function("command_encode_1000", |b| {
        b.iter(|| {
            encode_frame(&mut writer, &vertices);
            black_box(writer.len())
        });
    });
}

/// Benchmark: decode the same frame back.
fn bench_command_decode(c: &mut Criterion) {
    let vertices = [0u8; 36];
    let mut writer = StreamWriter::with_capacity(COMMANDS_PER_FRAME * 64);
    encode_frame(&mut writer, &vertices);

    c.bench_function("command_decode_1000", |b| {
        b.iter(|| {
            let mut reader = StreamReader::new(writer.as_slice());
            let mut decoded = 0usize;
            loop {
                match Command::decode(&mut reader) {
                    Command::End => break,
                    command => {
                        black_box(&command);
                        decoded += 1;
                    }
                }
            }
            decoded
        });
    });
}

criterion_group!(benches, bench_command_encode, bench_command_decode);
criterion_main!(benches);
