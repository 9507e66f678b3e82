//! Worker tick benchmark: cost of one bounded drain-promote-run cycle.
//!
//! Target: a full drain budget of stale envelopes in well under a frame

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::time::{Duration, Instant};
use vizrelay::worker::{handoff, HandoffQueue, WorkerContext, WorkerLoop, DEFAULT_DRAIN_BUDGET};
use vizrelay::{CommandEnvelope, PresentationTime, Scatter};

fn points(n: usize) -> Vec<[f32; 3]> {
    (0..n).map(|i| [i as f32 * 0.01, 0.0, 0.0]).collect()
}

fn fill(queue: &HandoffQueue, count: usize, time: PresentationTime) {
    for i in 0..count {
        queue.enqueue(CommandEnvelope::new(
            Scatter::new(points(10)).key(format!("k{}", i % 8)),
            time,
        ));
    }
}

fn worker(capacity: usize) -> (HandoffQueue, WorkerLoop) {
    let (queue, receiver) = handoff(capacity);
    let context = WorkerContext::new(Instant::now());
    (queue, WorkerLoop::new(receiver, context, DEFAULT_DRAIN_BUDGET))
}

fn tick_idle(c: &mut Criterion) {
    let (_queue, mut worker) = worker(100);
    c.bench_function("tick_idle", |b| {
        b.iter(|| black_box(worker.tick(Instant::now())));
    });
}

fn tick_fresh(c: &mut Criterion) {
    c.bench_function("tick_one_fresh_scatter", |b| {
        b.iter_batched(
            || {
                let (queue, worker) = worker(100);
                fill(&queue, 1, PresentationTime::now());
                (queue, worker)
            },
            |(_queue, mut worker)| black_box(worker.tick(Instant::now())),
            BatchSize::SmallInput,
        );
    });
}

fn tick_stale_backlog(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_stale_backlog");

    for backlog in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(backlog), &backlog, |b, &backlog| {
            b.iter_batched(
                || {
                    let (queue, worker) = worker(backlog);
                    let time =
                        PresentationTime::now().with_max_queue_time(Duration::from_millis(1));
                    fill(&queue, backlog, time);
                    (queue, worker)
                },
                // Far enough ahead that every envelope has gone stale.
                |(_queue, mut worker)| {
                    black_box(worker.tick(Instant::now() + Duration::from_secs(1)))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn tick_deferred_burst(c: &mut Criterion) {
    c.bench_function("tick_run_100_deferred", |b| {
        b.iter_batched(
            || {
                let (queue, mut worker) = worker(128);
                let start = Instant::now();
                for i in 0..100u64 {
                    let time = PresentationTime::at(Duration::from_millis(100 + i));
                    queue.enqueue(CommandEnvelope::new(
                        Scatter::new(points(10)).key(format!("d{i}")),
                        time,
                    ));
                    worker.tick(start);
                }
                (queue, worker)
            },
            |(_queue, mut worker)| black_box(worker.tick(Instant::now() + Duration::from_secs(1))),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    tick_idle,
    tick_fresh,
    tick_stale_backlog,
    tick_deferred_burst,
);
criterion_main!(benches);
