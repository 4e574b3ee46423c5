//! # Configstring Replication Benchmark
//!
//! Hot paths: chunk emission for oversized values, client-side reassembly,
//! and a full set-and-propagate against a table of ACTIVE clients.
//!
//! Run with: `cargo bench --package citadel_server`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use citadel_server::client::{ClientSlot, ClientState, RemoteKind};
use citadel_server::configstring;
use citadel_server::context::{LevelContext, LevelState};
use citadel_server::integration::stubs::{StubDemo, StubWorld};
use citadel_server::transmit;
use citadel_shared::protocol::ChunkReassembler;

fn bench_chunk_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_emission");
    for len in [500usize, 2_000, 8_000] {
        let value: String = "v".repeat(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &value, |b, value| {
            b.iter(|| black_box(transmit::configstring_commands(20, value)));
        });
    }
    group.finish();
}

fn bench_reassembly(c: &mut Criterion) {
    let value: String = "v".repeat(8_000);
    let commands = transmit::configstring_commands(20, &value);
    c.bench_function("reassemble_8k", |b| {
        b.iter(|| {
            let mut reassembler = ChunkReassembler::new();
            let mut done = None;
            for command in &commands {
                if let Ok(Some(update)) = reassembler.feed(command) {
                    done = Some(update);
                }
            }
            black_box(done)
        });
    });
}

fn bench_set_and_propagate(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_configstring");
    for clients in [8usize, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(clients), &clients, |b, &clients| {
            let mut level = LevelContext::new();
            level.state = LevelState::Game;
            let mut table: Vec<ClientSlot> = (0..clients)
                .map(|slot| {
                    let mut client = ClientSlot::new_free();
                    client.connect(slot, RemoteKind::Human, "\\name\\bench");
                    client.state = ClientState::Active;
                    client
                })
                .collect();
            let world = StubWorld::new(clients);
            let mut demo = StubDemo::default();
            let mut flip = 0u64;

            b.iter(|| {
                flip += 1;
                let value = format!("round {flip}");
                configstring::set_configstring(
                    &mut level,
                    &mut table,
                    &world,
                    &mut demo,
                    30,
                    Some(&value),
                )
                .unwrap();
                for client in &mut table {
                    client.commands.clear();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_chunk_emission,
    bench_reassembly,
    bench_set_and_propagate
);
criterion_main!(benches);
