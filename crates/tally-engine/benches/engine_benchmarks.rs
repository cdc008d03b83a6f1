//! Engine benchmarks.
//!
//! Measures full-log reconstruction and arbitrary-entry undo over simulated
//! sessions of increasing length.
//!
//! Run with: `cargo bench --bench engine_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tally_engine::prelude::*;

fn session(turns: u32) -> GameState {
    simulate_session(&SimulationConfig {
        turns,
        ..SimulationConfig::default()
    })
    .expect("simulated session")
}

/// The log as it stood just before END_GAME, so that undo is allowed.
fn playing(turns: u32) -> GameState {
    let ended = session(turns);
    let mut trimmed = ended.clone();
    trimmed.log.pop();
    reconstruct(&trimmed).expect("replay without END_GAME")
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");
    for turns in [10u32, 50, 200] {
        let state = session(turns);
        group.bench_with_input(
            BenchmarkId::from_parameter(state.log.len()),
            &state,
            |b, state| b.iter(|| reconstruct(black_box(state)).expect("replay")),
        );
    }
    group.finish();
}

fn bench_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo");
    for turns in [10u32, 50, 200] {
        let state = playing(turns);
        let middle = state.log.len() / 2;
        group.bench_with_input(
            BenchmarkId::new("can_undo_middle", state.log.len()),
            &state,
            |b, state| b.iter(|| can_undo(black_box(state), middle)),
        );
        group.bench_with_input(
            BenchmarkId::new("undo_last", state.log.len()),
            &state,
            |b, state| b.iter(|| undo(black_box(state.clone()), state.log.len() - 1)),
        );
    }
    group.finish();
}

fn bench_hash(c: &mut Criterion) {
    let state = session(200);
    c.bench_function("state_hash_200_turns", |b| {
        b.iter(|| state_hash(black_box(&state)).expect("hash"))
    });
}

criterion_group!(benches, bench_reconstruct, bench_undo, bench_hash);
criterion_main!(benches);
