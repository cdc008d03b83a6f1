//! Time cache benchmarks.
//!
//! Compares a full cache rebuild against the incremental refresh taken on
//! every append, and measures duration queries over long logs.
//!
//! Run with: `cargo bench --bench clock_benchmarks`

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tally_clock::prelude::*;
use tally_core::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// A log of `len` entries: adjustments, a turn change every tenth entry and
/// a pause/unpause pair every fiftieth.
fn build_log(len: usize) -> Vec<LogEntry> {
    let mut log = vec![LogEntry::new(GameAction::StartGame, Some(0), origin())];
    for i in 1..len {
        let at = origin() + Duration::seconds(i as i64 * 7);
        let entry = match i % 50 {
            48 => LogEntry::new(GameAction::Pause, None, at),
            49 => LogEntry::new(GameAction::Unpause, None, at),
            _ if i % 10 == 0 => LogEntry::new(GameAction::NextTurn, Some(0), at),
            _ => LogEntry::new(GameAction::AddCoins, Some(0), at),
        };
        log.push(entry);
    }
    log
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_rebuild_vs_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_cache");
    for len in [100usize, 1_000, 5_000] {
        let log = build_log(len);
        let warm = TimeCache::rebuild(&log[..len - 1]);

        group.bench_with_input(BenchmarkId::new("rebuild", len), &log, |b, log| {
            b.iter(|| black_box(TimeCache::rebuild(log)));
        });
        group.bench_with_input(BenchmarkId::new("refresh_one", len), &log, |b, log| {
            b.iter(|| {
                let mut cache = warm.clone();
                cache.refresh(log);
                black_box(cache)
            });
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let log = build_log(5_000);
    let cache = TimeCache::rebuild(&log);
    let now = origin() + Duration::hours(20);

    c.bench_function("duration_up_to_5000", |b| {
        b.iter(|| black_box(duration_up_to(&log, &cache, now)));
    });
    c.bench_function("turn_durations_5000", |b| {
        b.iter(|| black_box(turn_durations(&log, &cache)));
    });
}

criterion_group!(benches, bench_rebuild_vs_refresh, bench_queries);
criterion_main!(benches);
